//! LRC lyric adapter: line tags, ID tags, and enhanced word tags.
//!
//! The parser is forgiving. It accepts multiple time tags per
//! line (repeated occurrences of a chorus), `[offset:]` adjustment, 1 to 3
//! fractional digits in time tags, and enhanced `<mm:ss.xx>` word tags.
//! Anything that fails to parse as a tag is kept as literal text or ignored
//! rather than failing the document.

use crate::error::Result;
use crate::{FormatAdapter, GenerateOptions};
use kara_sync::types::{LyricLine, WordTimestamp};

pub struct LrcAdapter;

impl FormatAdapter for LrcAdapter {
    fn parse(&self, text: &str) -> Result<Vec<LyricLine>> {
        Ok(parse(text))
    }

    fn generate(&self, lines: &[LyricLine], options: &GenerateOptions) -> Result<String> {
        Ok(generate(lines, options))
    }
}

/// Parse LRC text into time-ordered lyric lines.
///
/// A line carrying exactly the same tag times as its predecessor is folded
/// in as that line's translation, the common bilingual LRC layout.
pub fn parse(text: &str) -> Vec<LyricLine> {
    let mut lines: Vec<LyricLine> = Vec::new();
    let mut offset_ms = 0.0;

    for raw in text.lines() {
        let trimmed = raw.trim_start_matches('\u{feff}').trim();
        if trimmed.is_empty() {
            continue;
        }

        let (mut timestamps, rest) = take_time_tags(trimmed);

        if timestamps.is_empty() {
            if let Some((key, value)) = parse_id_tag(trimmed)
                && key.eq_ignore_ascii_case("offset")
            {
                // A positive offset makes lyrics appear sooner.
                offset_ms = value.trim().parse::<f64>().unwrap_or(0.0);
            }
            // Other ID tags (ti, ar, al, by) carry no timing information,
            // and untagged lines are not LRC lyrics.
            continue;
        }

        timestamps.sort_by(f64::total_cmp);
        let (line_text, word_timestamps) = split_word_tags(rest);

        lines.push(LyricLine {
            text: line_text,
            timestamps,
            translated_text: None,
            word_timestamps,
        });
    }

    if offset_ms != 0.0 {
        for line in &mut lines {
            for t in &mut line.timestamps {
                *t -= offset_ms;
            }
            if let Some(words) = &mut line.word_timestamps {
                for word in words {
                    word.start_ms -= offset_ms;
                    word.end_ms -= offset_ms;
                }
            }
        }
    }

    lines.sort_by(|a, b| {
        let (a, b) = (
            a.start_ms().unwrap_or(f64::MAX),
            b.start_ms().unwrap_or(f64::MAX),
        );
        a.total_cmp(&b)
    });

    merge_bilingual(lines)
}

/// Render lines as LRC text.
///
/// With `word_timing`, lines carrying word spans get enhanced tags: the
/// line tag, one `<..>` tag per span, and a closing end tag. Translations
/// are emitted as a second line under the same time tags.
pub fn generate(lines: &[LyricLine], options: &GenerateOptions) -> String {
    let mut out = String::new();

    for line in lines {
        if line.timestamps.is_empty() {
            continue;
        }

        let tags: String = line
            .timestamps
            .iter()
            .map(|&t| format!("[{}]", format_time(t)))
            .collect();

        out.push_str(&tags);

        match &line.word_timestamps {
            Some(words) if options.word_timing && !words.is_empty() => {
                for word in words {
                    out.push('<');
                    out.push_str(&format_time(word.start_ms));
                    out.push('>');
                    out.push_str(&word.word);
                }
                if let Some(last) = words.last() {
                    out.push('<');
                    out.push_str(&format_time(last.end_ms));
                    out.push('>');
                }
            }
            _ => out.push_str(&flatten(&line.text)),
        }
        out.push('\n');

        if options.translations
            && let Some(translation) = &line.translated_text
        {
            out.push_str(&tags);
            out.push_str(&flatten(translation));
            out.push('\n');
        }
    }

    out
}

/// Fold consecutive lines with identical tag times into original plus
/// translation.
fn merge_bilingual(lines: Vec<LyricLine>) -> Vec<LyricLine> {
    let mut merged: Vec<LyricLine> = Vec::new();

    for line in lines {
        if let Some(last) = merged.last_mut()
            && !last.timestamps.is_empty()
            && last.timestamps == line.timestamps
            && last.translated_text.is_none()
        {
            last.translated_text = Some(line.text);
            continue;
        }
        merged.push(line);
    }

    merged
}

/// Strip leading `[..]` tags that parse as times, returning them in
/// milliseconds along with the remaining content.
fn take_time_tags(line: &str) -> (Vec<f64>, &str) {
    let mut times = Vec::new();
    let mut rest = line;

    while let Some(inner) = rest.strip_prefix('[') {
        let Some(end) = inner.find(']') else { break };
        let Some(ms) = parse_time(&inner[..end]) else {
            break;
        };
        times.push(ms);
        rest = &inner[end + 1..];
    }

    (times, rest)
}

/// Split a single whole-line `[key:value]` ID tag.
fn parse_id_tag(line: &str) -> Option<(&str, &str)> {
    let inner = line.strip_prefix('[')?.strip_suffix(']')?;
    inner.split_once(':')
}

/// Parse `mm:ss`, `mm:ss.x`, `mm:ss.xx`, or `mm:ss.xxx` into milliseconds.
fn parse_time(tag: &str) -> Option<f64> {
    let (minutes, seconds) = tag.split_once(':')?;
    let minutes: u32 = minutes.parse().ok()?;

    let (whole, frac) = match seconds.split_once('.') {
        Some((whole, frac)) => (whole, frac),
        None => (seconds, ""),
    };
    let secs: u32 = whole.parse().ok()?;
    let frac_ms = parse_frac_ms(frac)?;

    Some(f64::from(minutes) * 60_000.0 + f64::from(secs) * 1_000.0 + f64::from(frac_ms))
}

/// Fractional digits to milliseconds: `5` is 500 ms, `50` is 500 ms,
/// `505` is 505 ms. Digits past the third are truncated.
fn parse_frac_ms(frac: &str) -> Option<u32> {
    match frac.len() {
        0 => Some(0),
        1 => frac.parse::<u32>().ok().map(|v| v * 100),
        2 => frac.parse::<u32>().ok().map(|v| v * 10),
        _ => frac.get(..3)?.parse::<u32>().ok(),
    }
}

/// Split enhanced `<mm:ss.xx>` word tags out of line content.
///
/// Tagged segments become word spans; each span ends at the next tag, so a
/// trailing tag with no text closes the final word. Angle brackets that do
/// not wrap a time are kept as literal text.
fn split_word_tags(content: &str) -> (String, Option<Vec<WordTimestamp>>) {
    let content = content.trim();
    if !content.contains('<') {
        return (content.to_string(), None);
    }

    let mut plain = String::new();
    let mut tagged: Vec<(f64, String)> = Vec::new();
    let mut rest = content;

    let push_text = |plain: &mut String, tagged: &mut Vec<(f64, String)>, text: &str| {
        match tagged.last_mut() {
            Some((_, segment)) => segment.push_str(text),
            None => plain.push_str(text),
        }
    };

    while let Some(open) = rest.find('<') {
        push_text(&mut plain, &mut tagged, &rest[..open]);

        let after = &rest[open + 1..];
        let Some(close) = after.find('>') else {
            // Unterminated tag: keep the raw text.
            push_text(&mut plain, &mut tagged, "<");
            push_text(&mut plain, &mut tagged, after);
            rest = "";
            break;
        };

        match parse_time(&after[..close]) {
            Some(ms) => tagged.push((ms, String::new())),
            None => {
                push_text(&mut plain, &mut tagged, "<");
                push_text(&mut plain, &mut tagged, &after[..=close]);
            }
        }

        rest = &after[close + 1..];
    }
    push_text(&mut plain, &mut tagged, rest);

    if tagged.is_empty() {
        return (plain, None);
    }

    let mut words = Vec::new();
    for (i, (start, segment)) in tagged.iter().enumerate() {
        if segment.is_empty() {
            continue;
        }
        let end = tagged.get(i + 1).map(|(t, _)| *t).unwrap_or(*start);
        words.push(WordTimestamp::new(segment.clone(), *start, end));
    }

    let text: String = plain
        .chars()
        .chain(tagged.iter().flat_map(|(_, s)| s.chars()))
        .collect();

    let words = if words.is_empty() { None } else { Some(words) };
    (text, words)
}

/// Format milliseconds as `mm:ss.xx` (centiseconds).
fn format_time(ms: f64) -> String {
    let total_cs = (ms.max(0.0) / 10.0).round() as u64;
    let cs = total_cs % 100;
    let total_s = total_cs / 100;
    format!("{:02}:{:02}.{:02}", total_s / 60, total_s % 60, cs)
}

/// LRC content is line-oriented; collapse embedded newlines.
fn flatten(text: &str) -> String {
    text.replace('\n', " ")
}
