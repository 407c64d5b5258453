use crate::template::fields::ParameterType;

const BEFORE_WINDOW: usize = 20;
const AFTER_WINDOW: usize = 40;

const CURRENCY_SYMBOLS: [char; 3] = ['$', '€', '£'];
const CURRENCY_KEYWORDS: [&str; 5] = ["price", "preço", "valor", "custo", "total"];
const DATE_KEYWORDS_BEFORE: [&str; 8] = ["data", "hora", "date", "time", "quando", "when", "dia", "day"];
const DATE_KEYWORDS_AFTER: [&str; 4] = ["data", "hora", "date", "time"];

/// Guesses what kind of value `{{placeholder}}` stands for by looking at the
/// text around its first occurrence in `body`.
///
/// Only ever returns `Text`, `Currency` or `DateTime`; anything it cannot
/// place is `Text`.
pub fn infer_parameter_type(body: &str, placeholder: u32) -> ParameterType {
    let lower = body.to_lowercase();
    let needle = format!("{{{{{placeholder}}}}}");
    let Some(byte_pos) = lower.find(&needle) else {
        return ParameterType::Text;
    };

    let chars: Vec<char> = lower.chars().collect();
    let pos = lower[..byte_pos].chars().count();
    let before: String = chars[pos.saturating_sub(BEFORE_WINDOW)..pos].iter().collect();
    // the trailing window starts at the placeholder itself
    let after: String = chars[pos..(pos + AFTER_WINDOW).min(chars.len())].iter().collect();

    if has_symbol(&before) || has_any(&before, &CURRENCY_KEYWORDS) || has_symbol(&after) {
        return ParameterType::Currency;
    }
    if has_any(&before, &DATE_KEYWORDS_BEFORE) || has_any(&after, &DATE_KEYWORDS_AFTER) {
        return ParameterType::DateTime;
    }
    ParameterType::Text
}

fn has_symbol(window: &str) -> bool {
    window.contains(&CURRENCY_SYMBOLS[..])
}

fn has_any(window: &str, words: &[&str]) -> bool {
    words.iter().any(|w| window.contains(w))
}
