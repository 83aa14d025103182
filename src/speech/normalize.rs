//! Text clean-up before synthesis
//!
//! Replies are written for reading. VITS voices mispronounce symbols and read clock
//! times digit by digit, so those are spelled out first.

const SYMBOLS: &[(char, &str)] = &[
    ('&', "and"),
    ('%', "percent"),
    ('+', "plus"),
    ('@', "at"),
    ('=', "equals"),
    ('#', "number"),
];

const ONES: [&str; 20] = [
    "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten",
    "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen",
    "nineteen",
];

const TENS: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

/// Prepare a reply for speaking
pub fn normalize_for_speech(text: &str) -> String {
    let mut words = Vec::new();

    for token in text.split_whitespace() {
        let trailing = token
            .char_indices()
            .rev()
            .take_while(|(_, c)| matches!(c, '.' | ',' | '!' | '?' | ';'))
            .last()
            .map(|(i, _)| i)
            .unwrap_or(token.len());
        let (body, punctuation) = token.split_at(trailing);

        if let Some(spoken) = clock_time(body) {
            words.push(format!("{}{}", spoken, punctuation));
            continue;
        }

        let mut expanded = String::with_capacity(token.len());
        for c in token.chars() {
            match SYMBOLS.iter().find(|(symbol, _)| *symbol == c) {
                Some((_, word)) => {
                    expanded.push(' ');
                    expanded.push_str(word);
                    expanded.push(' ');
                }
                None => expanded.push(c),
            }
        }
        words.extend(expanded.split_whitespace().map(str::to_string));
    }

    words.join(" ")
}

/// `H:MM` or `H:MM:SS` as words, `None` for anything else
fn clock_time(token: &str) -> Option<String> {
    let parts: Vec<&str> = token.split(':').collect();
    if !(2..=3).contains(&parts.len()) {
        return None;
    }
    if parts[0].is_empty() || parts[0].len() > 2 {
        return None;
    }
    if parts[1..].iter().any(|p| p.len() != 2) {
        return None;
    }
    if !parts.iter().all(|p| p.chars().all(|c| c.is_ascii_digit())) {
        return None;
    }

    let values: Vec<u32> = parts.iter().filter_map(|p| p.parse().ok()).collect();
    let (hour, minute) = (values[0], values[1]);
    if hour > 23 || minute > 59 {
        return None;
    }

    let mut spoken = number_words(hour);
    match minute {
        0 => spoken.push_str(" o'clock"),
        1..=9 => {
            spoken.push_str(" oh ");
            spoken.push_str(ONES[minute as usize]);
        }
        _ => {
            spoken.push(' ');
            spoken.push_str(&number_words(minute));
        }
    }

    if let Some(&second) = values.get(2) {
        if second > 59 {
            return None;
        }
        if second > 0 {
            let unit = if second == 1 { "second" } else { "seconds" };
            spoken.push_str(&format!(" and {} {}", number_words(second), unit));
        }
    }

    Some(spoken)
}

/// Words for 0..100
fn number_words(n: u32) -> String {
    match n {
        0..=19 => ONES[n as usize].to_string(),
        20..=99 if n % 10 == 0 => TENS[(n / 10) as usize].to_string(),
        20..=99 => format!("{}-{}", TENS[(n / 10) as usize], ONES[(n % 10) as usize]),
        _ => n.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(
            normalize_for_speech("Hello! How can I help you today?"),
            "Hello! How can I help you today?"
        );
    }

    #[test]
    fn test_symbols() {
        assert_eq!(normalize_for_speech("rock & roll"), "rock and roll");
        assert_eq!(normalize_for_speech("50% off"), "50 percent off");
        assert_eq!(normalize_for_speech("a+b"), "a plus b");
    }

    #[test]
    fn test_time_reply() {
        assert_eq!(
            normalize_for_speech("The current time is 3:04:05 PM."),
            "The current time is three oh four and five seconds PM."
        );
        assert_eq!(normalize_for_speech("at 12:30"), "at twelve thirty");
        assert_eq!(normalize_for_speech("10:00:00 AM"), "ten o'clock AM");
        assert_eq!(normalize_for_speech("9:45:21,"), "nine forty-five and twenty-one seconds,");
    }

    #[test]
    fn test_non_times_left_alone() {
        assert_eq!(normalize_for_speech("ratio 3:4"), "ratio 3:4");
        assert_eq!(normalize_for_speech("25:61"), "25:61");
        assert_eq!(normalize_for_speech("a:bc"), "a:bc");
    }

    #[test]
    fn test_whitespace_collapsed() {
        assert_eq!(normalize_for_speech("  hi   there \n"), "hi there");
        assert_eq!(normalize_for_speech(""), "");
    }
}
