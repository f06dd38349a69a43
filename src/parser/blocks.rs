use std::sync::LazyLock;

use reqwest::Url;
use scraper::{ElementRef, Html, Node, Selector};

use super::{collapse_ws, resolve};

static IMG_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img").unwrap());
static CAPTION_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("figcaption").unwrap());

/// Dropped together with everything inside them.
const SKIPPED: &[&str] = &[
    "script", "style", "noscript", "iframe", "form", "button", "svg", "head", "template",
    "input", "select", "textarea",
];

/// Rendered into the surrounding paragraph rather than starting a new block.
const INLINE: &[&str] = &[
    "a", "b", "strong", "i", "em", "code", "kbd", "samp", "img", "br", "span", "small", "sup",
    "sub", "u", "abbr", "cite", "mark", "q", "s", "del", "ins", "time", "label", "font",
];

/// Inline wrappers that some editors put around whole blocks.
const WRAPPERS: &[&str] = &["span", "font", "u", "label"];

/// Block elements met in inline context still separate words.
const BLOCK_LIKE: &[&str] = &[
    "p", "div", "li", "h1", "h2", "h3", "h4", "h5", "h6", "tr", "td", "th", "section",
    "article", "blockquote", "figure", "figcaption", "ul", "ol", "dt", "dd", "table", "pre",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, text: String },
    Paragraph(String),
    List { ordered: bool, items: Vec<ListItem> },
    Quote(Vec<Block>),
    Code(String),
    Rule,
    Table(Vec<Vec<String>>),
    Definitions(Vec<Definition>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub text: String,
    /// Nested `List` blocks.
    pub children: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Definition {
    Term(String),
    Detail(String),
}

/// Parse an HTML fragment into a flat sequence of Markdown-ready blocks.
/// Links and images are made absolute against `base` when one is given.
pub fn classify_html(html: &str, base: Option<&Url>) -> Vec<Block> {
    let fragment = Html::parse_fragment(html);
    let mut builder = Builder::new(base);
    builder.walk(fragment.root_element());
    builder.finish()
}

struct Builder<'u> {
    base: Option<&'u Url>,
    blocks: Vec<Block>,
    inline: Inline<'u>,
}

impl<'u> Builder<'u> {
    fn new(base: Option<&'u Url>) -> Self {
        Self {
            base,
            blocks: Vec::new(),
            inline: Inline::new(base),
        }
    }

    fn finish(mut self) -> Vec<Block> {
        self.flush();
        self.blocks
    }

    /// Close the paragraph collected from loose inline content, if any.
    fn flush(&mut self) {
        let inline = std::mem::replace(&mut self.inline, Inline::new(self.base));
        let text = inline.finish();
        if !text.is_empty() {
            self.blocks.push(Block::Paragraph(text));
        }
    }

    fn push(&mut self, block: Option<Block>) {
        self.flush();
        self.blocks.extend(block);
    }

    fn walk(&mut self, el: ElementRef) {
        for child in el.children() {
            match child.value() {
                Node::Text(t) => self.inline.push_text(t),
                Node::Element(_) => {
                    if let Some(c) = ElementRef::wrap(child) {
                        self.element(c);
                    }
                }
                _ => {}
            }
        }
    }

    fn element(&mut self, el: ElementRef) {
        let base = self.base;
        let name = el.value().name();
        match name {
            n if SKIPPED.contains(&n) => {}
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = name[1..].parse().unwrap_or(1);
                let text = inline_of(el, base);
                self.push((!text.is_empty()).then_some(Block::Heading { level, text }));
            }
            "p" => {
                let text = inline_of(el, base);
                self.push((!text.is_empty()).then_some(Block::Paragraph(text)));
            }
            "ul" | "ol" => self.push(list_block(el, base)),
            "blockquote" => {
                let mut inner = Builder::new(base);
                inner.walk(el);
                let blocks = inner.finish();
                self.push((!blocks.is_empty()).then_some(Block::Quote(blocks)));
            }
            "pre" => {
                let raw: String = el.text().collect();
                let code = raw.trim_end_matches('\n');
                self.push((!code.trim().is_empty()).then(|| Block::Code(code.to_string())));
            }
            "hr" => self.push(Some(Block::Rule)),
            "table" => self.push(table_block(el, base)),
            "figure" => {
                self.flush();
                for img in el.select(&IMG_SEL) {
                    self.blocks.extend(image(img, base).map(Block::Paragraph));
                }
                let caption = el
                    .select(&CAPTION_SEL)
                    .next()
                    .map(|cap| inline_of(cap, base))
                    .filter(|t| !t.is_empty());
                self.blocks
                    .extend(caption.map(|t| Block::Paragraph(format!("*{t}*"))));
            }
            "dl" => self.push(definitions_block(el, base)),
            n if WRAPPERS.contains(&n) && wraps_blocks(el) => {
                self.flush();
                self.walk(el);
                self.flush();
            }
            n if INLINE.contains(&n) => self.inline.element(el),
            // div, section, article, main, …: transparent
            _ => {
                self.flush();
                self.walk(el);
                self.flush();
            }
        }
    }
}

/// Inline Markdown accumulator with HTML whitespace collapsing.
struct Inline<'u> {
    base: Option<&'u Url>,
    out: String,
    pending_space: bool,
    leading_space: bool,
}

impl<'u> Inline<'u> {
    fn new(base: Option<&'u Url>) -> Self {
        Self {
            base,
            out: String::new(),
            pending_space: false,
            leading_space: false,
        }
    }

    fn finish(self) -> String {
        self.out
            .lines()
            .map(str::trim)
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string()
    }

    fn space(&mut self) {
        if self.out.is_empty() {
            self.leading_space = true;
        }
        self.pending_space = true;
    }

    fn flush_space(&mut self) {
        if self.pending_space && !matches!(self.out.chars().last(), None | Some(' ' | '\n')) {
            self.out.push(' ');
        }
        self.pending_space = false;
    }

    fn push_text(&mut self, text: &str) {
        for ch in text.chars() {
            if ch.is_whitespace() {
                self.space();
            } else {
                self.flush_space();
                self.out.push(ch);
            }
        }
    }

    fn push_raw(&mut self, s: &str) {
        self.flush_space();
        self.out.push_str(s);
    }

    fn line_break(&mut self) {
        self.pending_space = false;
        if !matches!(self.out.chars().last(), None | Some('\n')) {
            self.out.push('\n');
        }
    }

    fn children(&mut self, el: ElementRef) {
        for child in el.children() {
            match child.value() {
                Node::Text(t) => self.push_text(t),
                Node::Element(_) => {
                    if let Some(c) = ElementRef::wrap(child) {
                        self.element(c);
                    }
                }
                _ => {}
            }
        }
    }

    fn element(&mut self, el: ElementRef) {
        match el.value().name() {
            n if SKIPPED.contains(&n) => {}
            "br" => self.line_break(),
            "b" | "strong" => self.wrapped(el, "**"),
            "i" | "em" => self.wrapped(el, "*"),
            "code" | "kbd" | "samp" => {
                let text = collapse_ws(&el.text().collect::<String>());
                if !text.is_empty() {
                    self.push_raw(&format!("`{text}`"));
                }
            }
            "a" => self.link(el),
            "img" => {
                if let Some(md) = image(el, self.base) {
                    self.push_raw(&md);
                }
            }
            n if BLOCK_LIKE.contains(&n) => {
                self.space();
                self.children(el);
                self.space();
            }
            _ => self.children(el),
        }
    }

    fn wrapped(&mut self, el: ElementRef, marker: &str) {
        let mut inner = Inline::new(self.base);
        inner.children(el);
        self.splice(inner, |text| format!("{marker}{text}{marker}"));
    }

    fn link(&mut self, el: ElementRef) {
        let href = el
            .value()
            .attr("href")
            .and_then(|h| absolute(self.base, h));
        let mut inner = Inline::new(self.base);
        inner.children(el);
        match href {
            Some(href) => self.splice(inner, |text| format!("[{text}]({href})")),
            None => self.splice(inner, str::to_string),
        }
    }

    /// Insert a rendered child, moving its edge whitespace outside the markup.
    fn splice(&mut self, inner: Inline, wrap: impl FnOnce(&str) -> String) {
        if inner.leading_space {
            self.space();
        }
        let trailing = inner.pending_space;
        let text = inner.finish();
        if !text.is_empty() {
            self.push_raw(&wrap(&text));
        }
        if trailing {
            self.space();
        }
    }
}

fn wraps_blocks(el: ElementRef) -> bool {
    el.descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .map(|d| d.value().name())
        .any(|n| matches!(n, "hr" | "dl") || BLOCK_LIKE.contains(&n))
}

fn inline_of(el: ElementRef, base: Option<&Url>) -> String {
    let mut inline = Inline::new(base);
    inline.children(el);
    inline.finish()
}

fn absolute(base: Option<&Url>, href: &str) -> Option<String> {
    match base {
        Some(base) => resolve(base, href).map(|u| u.to_string()),
        None => {
            let href = href.trim();
            let usable = !href.is_empty() && !href.starts_with('#') && !href.starts_with("javascript:");
            usable.then(|| href.to_string())
        }
    }
}

fn image(el: ElementRef, base: Option<&Url>) -> Option<String> {
    let src = el.value().attr("src").and_then(|s| absolute(base, s))?;
    let alt = collapse_ws(el.value().attr("alt").unwrap_or(""));
    Some(format!("![{alt}]({src})"))
}

fn list_block(el: ElementRef, base: Option<&Url>) -> Option<Block> {
    let ordered = el.value().name() == "ol";
    let items: Vec<ListItem> = el
        .children()
        .filter_map(ElementRef::wrap)
        .filter(|c| c.value().name() == "li")
        .filter_map(|li| list_item(li, base))
        .collect();
    (!items.is_empty()).then_some(Block::List { ordered, items })
}

fn list_item(li: ElementRef, base: Option<&Url>) -> Option<ListItem> {
    let mut inline = Inline::new(base);
    let mut children = Vec::new();

    for child in li.children() {
        match child.value() {
            Node::Text(t) => inline.push_text(t),
            Node::Element(e) if matches!(e.name(), "ul" | "ol") => {
                children.extend(ElementRef::wrap(child).and_then(|c| list_block(c, base)));
            }
            Node::Element(_) => {
                if let Some(c) = ElementRef::wrap(child) {
                    inline.element(c);
                }
            }
            _ => {}
        }
    }

    let text = inline.finish();
    (!text.is_empty() || !children.is_empty()).then_some(ListItem { text, children })
}

fn table_block(el: ElementRef, base: Option<&Url>) -> Option<Block> {
    let rows: Vec<Vec<String>> = own_rows(el)
        .into_iter()
        .map(|tr| {
            tr.children()
                .filter_map(ElementRef::wrap)
                .filter(|c| matches!(c.value().name(), "td" | "th"))
                .map(|cell| inline_of(cell, base))
                .collect::<Vec<_>>()
        })
        .filter(|cells| cells.iter().any(|c| !c.is_empty()))
        .collect();
    (!rows.is_empty()).then_some(Block::Table(rows))
}

/// Rows of this table only; rows of tables nested in cells stay inside their cell.
fn own_rows(table: ElementRef) -> Vec<ElementRef> {
    let mut rows = Vec::new();
    for child in table.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "tr" => rows.push(child),
            "thead" | "tbody" | "tfoot" => rows.extend(
                child
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|r| r.value().name() == "tr"),
            ),
            _ => {}
        }
    }
    rows
}

fn definitions_block(el: ElementRef, base: Option<&Url>) -> Option<Block> {
    let defs: Vec<Definition> = el
        .children()
        .filter_map(ElementRef::wrap)
        .filter_map(|c| {
            let text = inline_of(c, base);
            if text.is_empty() {
                return None;
            }
            match c.value().name() {
                "dt" => Some(Definition::Term(text)),
                "dd" => Some(Definition::Detail(text)),
                _ => None,
            }
        })
        .collect();
    (!defs.is_empty()).then_some(Block::Definitions(defs))
}

// ── Tests ──
