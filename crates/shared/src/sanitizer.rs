use once_cell::sync::Lazy;
use regex::Regex;

/// Line prefixes that mark image captions and photo credits.
static CAPTION_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^This image",
        r"^This photo",
        r"^Photo by",
        r"^Image by",
        r"^Image released by",
        r"^Image via",
        r"^Photo via",
        r"^\(Photo by",
        r"^\(Image by",
        r"^\(AP Photo",
        r"^\(.*?via AP\)",
        r"^\(.*?Photo.*?\)",
        r"^Director.*?pose for photographers",
        r"^This image released by",
    ]
    .iter()
    .map(|pattern| Regex::new(&format!("(?i){}", pattern)).expect("caption pattern is valid"))
    .collect()
});

static EXCESS_NEWLINES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("newline pattern is valid"));

const SHORT_LINE_CHARS: usize = 20;

/// Remove image captions and photo credits from scraped article text.
///
/// Every line is trimmed. Caption lines are dropped, as are short all-caps
/// lines without terminal punctuation. Blank lines survive but runs of them
/// collapse to a single blank line.
pub fn sanitize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let kept: Vec<&str> = text
        .split('\n')
        .map(str::trim)
        .filter(|line| line.is_empty() || !(is_caption(line) || is_short_caps(line)))
        .collect();

    let joined = kept.join("\n");
    EXCESS_NEWLINES
        .replace_all(&joined, "\n\n")
        .trim()
        .to_string()
}

fn is_caption(line: &str) -> bool {
    CAPTION_PATTERNS.iter().any(|re| re.is_match(line))
}

fn is_short_caps(line: &str) -> bool {
    line.chars().count() < SHORT_LINE_CHARS
        && !line.ends_with(['.', '!', '?'])
        && is_all_upper(line)
}

// True when the line has cased letters and none of them are lower-case.
fn is_all_upper(line: &str) -> bool {
    let mut has_cased = false;
    for c in line.chars() {
        if c.is_lowercase() {
            return false;
        }
        if c.is_uppercase() {
            has_cased = true;
        }
    }
    has_cased
}
