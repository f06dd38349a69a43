use reqwest::Url;

use super::blocks::{classify_html, Block, Definition, ListItem};

/// HTML fragment → Markdown. Blocks are separated by a blank line and
/// non-empty output ends with a single newline.
pub fn html_to_markdown(html: &str, base: Option<&Url>) -> String {
    render(&classify_html(html, base))
}

pub fn render(blocks: &[Block]) -> String {
    let mut md = join_blocks(blocks);
    if !md.is_empty() {
        md.push('\n');
    }
    md
}

fn join_blocks(blocks: &[Block]) -> String {
    blocks
        .iter()
        .map(render_block)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn render_block(block: &Block) -> String {
    match block {
        Block::Heading { level, text } => format!("{} {}", "#".repeat(*level as usize), text),
        Block::Paragraph(text) => text.clone(),
        Block::List { ordered, items } => {
            let mut lines = Vec::new();
            render_list(*ordered, items, 0, &mut lines);
            lines.join("\n")
        }
        Block::Quote(inner) => join_blocks(inner)
            .lines()
            .map(|l| if l.is_empty() { ">".to_string() } else { format!("> {l}") })
            .collect::<Vec<_>>()
            .join("\n"),
        Block::Code(code) => format!("```\n{code}\n```"),
        Block::Rule => "---".to_string(),
        Block::Table(rows) => render_table(rows),
        Block::Definitions(defs) => defs
            .iter()
            .map(|d| match d {
                Definition::Term(t) => format!("**{t}**"),
                Definition::Detail(t) => format!(": {t}"),
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn render_list(ordered: bool, items: &[ListItem], depth: usize, lines: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    for (i, item) in items.iter().enumerate() {
        let marker = if ordered {
            format!("{}.", i + 1)
        } else {
            "-".to_string()
        };
        let text = item.text.replace('\n', &format!("\n{indent}  "));
        lines.push(format!("{indent}{marker} {text}").trim_end().to_string());

        for child in &item.children {
            if let Block::List { ordered, items } = child {
                render_list(*ordered, items, depth + 1, lines);
            }
        }
    }
}

fn render_table(rows: &[Vec<String>]) -> String {
    let Some((header, body)) = rows.split_first() else {
        return String::new();
    };
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let line = |cells: &[String]| {
        let mut cells: Vec<String> = cells
            .iter()
            .map(|c| c.replace('|', "\\|").replace('\n', " "))
            .collect();
        cells.resize(width, String::new());
        format!("| {} |", cells.join(" | "))
    };

    let mut out = vec![line(header.as_slice()), format!("|{}", " --- |".repeat(width))];
    out.extend(body.iter().map(|r| line(r.as_slice())));
    out.join("\n")
}

// ── Tests ──
