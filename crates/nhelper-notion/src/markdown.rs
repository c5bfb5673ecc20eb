//! A small markdown subset rendered as content blocks.
//!
//! Supported: `#`..`###` headings (deeper levels clamp to 3), `-`/`*` bullets,
//! `1.` numbered items, `>` quotes, fenced code with a language tag,
//! horizontal rules, and inline `**bold**`, `` `code` `` and `[text](url)`.
//! Consecutive plain lines form one paragraph; blank lines end it.

use nhelper_core::MarkdownConverter;
use nhelper_domain::{Block, RichText};

#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownBlocks;

impl MarkdownConverter for MarkdownBlocks {
    fn convert(&self, markdown: &str) -> Vec<Block> {
        let mut blocks = Vec::new();
        let mut paragraph: Vec<&str> = Vec::new();
        let mut lines = markdown.lines();

        while let Some(line) = lines.next() {
            let content = line.trim();

            if let Some(language) = content.strip_prefix("```") {
                flush_paragraph(&mut paragraph, &mut blocks);
                let mut code = Vec::new();
                for inner in lines.by_ref() {
                    if inner.trim_start().starts_with("```") {
                        break;
                    }
                    code.push(inner);
                }
                blocks.push(Block::Code {
                    language: language.trim().to_string(),
                    text: code.join("\n"),
                });
                continue;
            }

            if content.is_empty() {
                flush_paragraph(&mut paragraph, &mut blocks);
                continue;
            }

            let block = if is_rule(content) {
                Some(Block::Divider)
            } else if let Some((level, rest)) = heading(content) {
                Some(Block::Heading {
                    level,
                    text: parse_inline(rest),
                })
            } else if let Some(rest) = content
                .strip_prefix("- ")
                .or_else(|| content.strip_prefix("* "))
            {
                Some(Block::BulletedListItem {
                    text: parse_inline(rest.trim()),
                })
            } else if let Some(rest) = numbered(content) {
                Some(Block::NumberedListItem {
                    text: parse_inline(rest),
                })
            } else {
                content.strip_prefix('>').map(|rest| Block::Quote {
                    text: parse_inline(rest.trim()),
                })
            };

            match block {
                Some(block) => {
                    flush_paragraph(&mut paragraph, &mut blocks);
                    blocks.push(block);
                }
                None => paragraph.push(content),
            }
        }
        flush_paragraph(&mut paragraph, &mut blocks);
        blocks
    }
}

fn flush_paragraph(paragraph: &mut Vec<&str>, blocks: &mut Vec<Block>) {
    if paragraph.is_empty() {
        return;
    }
    blocks.push(Block::Paragraph {
        text: parse_inline(&paragraph.join("\n")),
    });
    paragraph.clear();
}

fn is_rule(line: &str) -> bool {
    let marks: Vec<char> = line.chars().filter(|ch| !ch.is_whitespace()).collect();
    marks.len() >= 3
        && matches!(marks[0], '-' | '*' | '_')
        && marks.iter().all(|ch| *ch == marks[0])
}

fn heading(line: &str) -> Option<(u8, &str)> {
    let hashes = line.chars().take_while(|ch| *ch == '#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    let rest = line[hashes..].strip_prefix(' ')?;
    Some(((hashes as u8).min(3), rest.trim()))
}

fn numbered(line: &str) -> Option<&str> {
    let digits = line.chars().take_while(|ch| ch.is_ascii_digit()).count();
    if digits == 0 {
        return None;
    }
    let rest = &line[digits..];
    rest.strip_prefix(". ")
        .or_else(|| rest.strip_prefix(") "))
        .map(str::trim)
}

/// Splits inline markup into styled runs. Unmatched markers stay literal.
pub fn parse_inline(text: &str) -> Vec<RichText> {
    let mut runs = Vec::new();
    let mut buffer = String::new();
    let mut bold = false;
    let mut rest = text;

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("**") {
            if bold || after.contains("**") {
                flush_run(&mut buffer, bold, &mut runs);
                bold = !bold;
                rest = after;
                continue;
            }
        }
        if let Some(after) = rest.strip_prefix('`') {
            if let Some(end) = after.find('`') {
                flush_run(&mut buffer, bold, &mut runs);
                let mut run = RichText::plain(&after[..end]).code();
                run.bold = bold;
                runs.push(run);
                rest = &after[end + 1..];
                continue;
            }
        }
        if rest.starts_with('[') {
            if let Some((label, url, after)) = link(rest) {
                flush_run(&mut buffer, bold, &mut runs);
                let mut run = RichText::linked(label, url);
                run.bold = bold;
                runs.push(run);
                rest = after;
                continue;
            }
        }

        let mut chars = rest.chars();
        if let Some(ch) = chars.next() {
            buffer.push(ch);
        }
        rest = chars.as_str();
    }
    flush_run(&mut buffer, bold, &mut runs);
    runs
}

fn flush_run(buffer: &mut String, bold: bool, runs: &mut Vec<RichText>) {
    if buffer.is_empty() {
        return;
    }
    let mut run = RichText::plain(std::mem::take(buffer));
    run.bold = bold;
    runs.push(run);
}

/// `[label](url)` at the start of `text`, with the remainder.
fn link(text: &str) -> Option<(&str, &str, &str)> {
    let close = text.find("](")?;
    let label = &text[1..close];
    let tail = &text[close + 2..];
    let end = tail.find(')')?;
    Some((label, &tail[..end], &tail[end + 1..]))
}
