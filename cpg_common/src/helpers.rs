/// Parse a boolean flag from a string value, or return the given default value otherwise.
pub fn parse_boolean_flag(value: Option<String>, default: bool) -> bool {
    let value = match value {
        Some(v) => v,
        None => return default,
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

/// Masks all but the last four digits of a card number. Numbers with four or fewer characters are masked completely.
pub fn mask_card_number(number: &str) -> String {
    let digits = number.chars().filter(|c| !c.is_whitespace()).collect::<Vec<char>>();
    if digits.len() <= 4 {
        return "*".repeat(digits.len());
    }
    let visible = digits.len() - 4;
    digits.iter().enumerate().map(|(i, c)| if i < visible { '*' } else { *c }).collect()
}
