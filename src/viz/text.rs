//! Text measurement and wrapping. Plotters cannot measure text before a backend
//! exists, so layout works from per-character width estimates.

/// Estimated advance of one character, as a fraction of the font size.
fn char_advance(ch: char) -> f32 {
    match ch {
        'i' | 'j' | 'l' | '.' | ',' | ':' | ';' | '\'' | '|' | '!' => 0.30,
        ' ' | 'f' | 't' | 'r' | '(' | ')' | '-' => 0.40,
        'M' | 'W' | 'm' | 'w' | '%' | '@' => 0.85,
        c if c.is_ascii_uppercase() || c.is_ascii_digit() => 0.64,
        _ => 0.56,
    }
}

/// Estimated pixel width of a single line.
pub fn estimate_text_width_px(text: &str, font_px: u32) -> u32 {
    let em: f32 = text.chars().map(char_advance).sum();
    (em * font_px as f32).ceil() as u32
}

/// Width and height of a block of lines at `font_px`, line height included.
pub fn text_block_size(lines: &[&str], font_px: u32) -> (u32, u32) {
    let w = lines
        .iter()
        .map(|l| estimate_text_width_px(l, font_px))
        .max()
        .unwrap_or(0);
    (w, lines.len() as u32 * line_height(font_px))
}

pub fn line_height(font_px: u32) -> u32 {
    font_px + font_px / 4 + 1
}

/// Cut `text` so it fits `max_px`, ending in an ellipsis when shortened.
pub fn truncate_to_width(text: &str, font_px: u32, max_px: u32) -> String {
    if estimate_text_width_px(text, font_px) <= max_px {
        return text.to_string();
    }
    let budget = max_px.saturating_sub(estimate_text_width_px("…", font_px));
    let mut out = String::new();
    let mut used = 0u32;
    for ch in text.chars() {
        let w = (char_advance(ch) * font_px as f32).ceil() as u32;
        if used + w > budget {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push('…');
    out
}

/// Greedy word wrap to `max_px`; words longer than a line are truncated.
pub fn wrap_text_to_width(text: &str, font_px: u32, max_px: u32) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut cur = String::new();
    for word in text.split_whitespace() {
        let candidate = if cur.is_empty() {
            word.to_string()
        } else {
            format!("{cur} {word}")
        };
        if estimate_text_width_px(&candidate, font_px) <= max_px {
            cur = candidate;
            continue;
        }
        if !cur.is_empty() {
            lines.push(std::mem::take(&mut cur));
        }
        if estimate_text_width_px(word, font_px) <= max_px {
            cur = word.to_string();
        } else {
            lines.push(truncate_to_width(word, font_px, max_px));
        }
    }
    if !cur.is_empty() {
        lines.push(cur);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_respects_width() {
        let lines = wrap_text_to_width("NET SALES (1.2M) GROSS MARGIN (300.0K)", 12, 120);
        assert!(lines.len() > 1);
        for l in &lines {
            assert!(estimate_text_width_px(l, 12) <= 120, "{l:?} too wide");
        }
    }

    #[test]
    fn truncate_adds_ellipsis() {
        let t = truncate_to_width("ABCDEFGHIJKLMNOP", 12, 40);
        assert!(t.ends_with('…'));
        assert_eq!(truncate_to_width("ok", 12, 400), "ok");
    }
}
