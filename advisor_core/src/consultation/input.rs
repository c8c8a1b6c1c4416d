//! Validators for user answers.
//!
//! Each returns the parsed value, or the message to show before asking again.

/// Comma-separated ingredient names, lowercased, without blanks or repeats.
pub fn parse_ingredients(line: &str) -> Result<Vec<String>, String> {
    Ok(split_list(line))
}

/// A strictly positive number of minutes.
pub fn parse_minutes(line: &str) -> Result<u32, String> {
    let minutes: i64 = line
        .trim()
        .parse()
        .map_err(|_| "Invalid input. Enter a whole number (e.g. 30).".to_string())?;
    if minutes <= 0 {
        return Err("Enter a positive number.".to_string());
    }
    u32::try_from(minutes).map_err(|_| "That is a lot of minutes. Enter a smaller number.".to_string())
}

/// Dietary preferences; an empty answer or "none" means no preference.
pub fn parse_preferences(line: &str) -> Result<Vec<String>, String> {
    let preferences = split_list(line);
    match preferences.as_slice() {
        [only] if only == "none" || only == "nessuna" => Ok(Vec::new()),
        _ => Ok(preferences),
    }
}

/// A 1-based choice among `count` options, returned 0-based.
pub fn parse_choice(line: &str, count: usize) -> Result<usize, String> {
    let choice: usize = line
        .trim()
        .parse()
        .map_err(|_| "Invalid input. Enter a number.".to_string())?;
    if (1..=count).contains(&choice) {
        Ok(choice - 1)
    } else {
        Err("Invalid choice. Enter a number from the list.".to_string())
    }
}

pub fn parse_yes_no(line: &str) -> Result<bool, String> {
    match line.trim().to_lowercase().as_str() {
        "y" | "yes" | "s" | "si" => Ok(true),
        "n" | "no" => Ok(false),
        _ => Err("Answer y or n.".to_string()),
    }
}

/// "1" for the default estimate, "2" to refine from the dataset first.
pub fn parse_refine_choice(line: &str) -> Result<bool, String> {
    match line.trim() {
        "1" => Ok(false),
        "2" => Ok(true),
        _ => Err("Enter 1 or 2.".to_string()),
    }
}

fn split_list(line: &str) -> Vec<String> {
    let mut items: Vec<String> = Vec::new();
    for item in line.split(',').map(|s| s.trim().to_lowercase()) {
        if !item.is_empty() && !items.contains(&item) {
            items.push(item);
        }
    }
    items
}
