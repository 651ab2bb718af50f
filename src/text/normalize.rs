// Text normalizer: raw extracted post text -> canonical content string.
//
// The feed markup wraps post text in formatting noise: hard line breaks
// between paragraphs, smart quotes, emoji, markdown-ish emphasis and the
// "hashtag #topic" accessibility prefix. Everything downstream (sentiment,
// the CSV store, reports) sees only the normalized form.
//
// The function is total and idempotent: normalize(normalize(x)) == normalize(x).

use std::sync::LazyLock;

use regex_lite::Regex;

/// `*text*`, `**text**`, `***text***` (and unbalanced 1-3 marker runs).
static STAR_EMPHASIS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\*{1,3}([^*]*)\*{1,3}").expect("valid star emphasis pattern"));

/// `_text_`, `__text__`, `___text___`.
static UNDERSCORE_EMPHASIS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_{1,3}([^_]*)_{1,3}").expect("valid underscore pattern"));

/// "hashtag #rust", including chained "hashtag hashtag #rust" left by nested markup.
static HASHTAG_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(?:hashtag\s*)+#").expect("valid hashtag pattern"));

/// Normalize raw post text. Empty input yields an empty string.
pub fn normalize(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    // 1. Line breaks (and any non-ASCII whitespace) become plain spaces
    let text = raw.replace("\r\n", " ");
    let text: String = text.chars().map(flatten_whitespace).collect();

    // 2. Smart quotes and backticks to straight quotes
    let text: String = text.chars().map(straighten_quote).collect();

    // 3. Emoji, pictographs, stray symbols and control characters
    let text: String = text.chars().filter(|c| !is_stripped_symbol(*c)).collect();

    // 4. Markdown emphasis markers, keeping the enclosed text
    let text = STAR_EMPHASIS.replace_all(&text, "$1");
    let text = UNDERSCORE_EMPHASIS.replace_all(&text, "$1");

    // 5. Residual formatting glyphs
    let text: String = text
        .chars()
        .filter(|c| !matches!(c, '`' | '~' | '•' | '◦' | '▪' | '▫' | '‣'))
        .collect();

    // 6. "hashtag #topic" -> "#topic"
    let text = HASHTAG_PREFIX.replace_all(&text, "#");

    // 7. Collapse whitespace runs and trim
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn flatten_whitespace(c: char) -> char {
    match c {
        '\n' | '\r' | '\u{85}' | '\u{2028}' | '\u{2029}' => ' ',
        c if !c.is_ascii() && c.is_whitespace() => ' ',
        c => c,
    }
}

fn straighten_quote(c: char) -> char {
    match c {
        '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{201B}' | '\u{2032}' => '\'',
        '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{201F}' | '\u{2033}' => '"',
        '`' | '\u{B4}' => '\'',
        c => c,
    }
}

/// Characters removed outright: emoji blocks, dingbats, emoji joiners,
/// a handful of math/typographic symbols, and C0 controls other than
/// tab/newline/carriage return (those are whitespace handled elsewhere).
fn is_stripped_symbol(c: char) -> bool {
    let cp = c as u32;
    matches!(
        cp,
        0x1F600..=0x1F64F // emoticons
            | 0x1F300..=0x1F5FF // misc symbols and pictographs
            | 0x1F680..=0x1F6FF // transport and map
            | 0x1F1E0..=0x1F1FF // regional indicators (flags)
            | 0x1F900..=0x1F9FF // supplemental symbols and pictographs
            | 0x1FA70..=0x1FAFF // symbols and pictographs extended-A
            | 0x2600..=0x26FF // misc symbols
            | 0x2700..=0x27BF // dingbats
            | 0x1F780..=0x1F7FF // geometric shapes extended
            | 0x1F800..=0x1F8FF // supplemental arrows-C
            | 0x2B1B | 0x2B1C | 0x2B50 | 0x2B55
            | 0x200D // zero width joiner
            | 0xFE0F // emoji presentation selector
            | 0x20E3 // combining keycap
            | 0x00..=0x08
            | 0x0B
            | 0x0C
            | 0x0E..=0x1F
            | 0x7F
    ) || matches!(
        c,
        '≈' | '≠' | '≤' | '≥' | '±' | '×' | '÷' | '√' | '∞' | '∆' | '∑' | '∏' | '∫' | '†' | '‡'
            | '§' | '¶'
    )
}
