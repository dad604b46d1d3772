//! Markdown adapter: drives the element resolver from pulldown-cmark events.
//!
//! Every element in the event stream becomes one [`ElementResolver::render`]
//! call. Children are rendered first, so each call receives a children payload
//! of finished nodes, and the enclosing element's tag is passed as
//! `parentName` so scopes can target e.g. `pre.code` separately from inline
//! `code`. Heading attributes that collide with bookkeeping keys are dropped.
//!
//! Tags produced:
//!
//! | Markdown            | Tag                                  |
//! |---------------------|--------------------------------------|
//! | paragraph           | `p`                                  |
//! | heading             | `h1` … `h6` (`id`, `className`)      |
//! | fenced code         | `pre` > `code` (`className`, `metastring`) |
//! | inline code         | `inlineCode`                         |
//! | list / item         | `ul`, `ol` (`start`), `li`           |
//! | task marker         | `input` (`type`, `checked`, `disabled`) |
//! | rule                | `thematicBreak`                      |
//! | strikethrough       | `delete`                             |
//! | table               | `table`, `thead` > `tr` > `th`, `tbody` > `tr` > `td` |
//! | raw HTML            | [`Node::Raw`], no tag                |
//! | footnotes           | `footnoteDefinition`, `footnoteReference` |
//! | math                | `inlineMath`, `math`                 |
//!
//! The document itself is rendered last, through the `wrapper` tag.

use pulldown_cmark::{
    Alignment, BlockQuoteKind, CodeBlockKind, CowStr, Event, LinkType, Options, Parser, Tag,
};

use crate::defaults::WRAPPER_TAG;
use crate::error::ComponentError;
use crate::node::Node;
use crate::props::{PropertyBag, is_reserved};
use crate::resolver::ElementResolver;
use crate::scope::Scope;
use crate::util::{heading_level_to_num, split_fence_info};

/// Renders markdown into a [`Node`] tree through an [`ElementResolver`].
///
/// # Example
///
/// ```
/// use docscope_render::{MarkdownRenderer, RendererMap, Scope};
///
/// let scope = Scope::root().enter(RendererMap::from_aliases([("h1", "h2")]));
/// let doc = MarkdownRenderer::new()
///     .render_markdown("# Title\n\nBody", &scope)
///     .unwrap();
///
/// let docscope_render::Node::Fragment(blocks) = doc else { panic!() };
/// assert_eq!(blocks[0].name(), Some("h2"));
/// assert_eq!(blocks[1].name(), Some("p"));
/// ```
#[derive(Clone, Debug)]
pub struct MarkdownRenderer {
    resolver: ElementResolver,
    gfm: bool,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownRenderer {
    /// Create a renderer with the standard resolver and GFM enabled.
    #[must_use]
    pub fn new() -> Self {
        Self {
            resolver: ElementResolver::standard(),
            gfm: true,
        }
    }

    /// Use a specific resolver (e.g. one with a custom default table).
    #[must_use]
    pub fn with_resolver(mut self, resolver: ElementResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Enable or disable GitHub Flavored Markdown features.
    ///
    /// GFM is enabled by default. When enabled, the parser supports:
    /// - Tables
    /// - Strikethrough (`~~text~~`)
    /// - Task lists (`- [ ] item`)
    /// - Footnotes
    #[must_use]
    pub fn with_gfm(mut self, enabled: bool) -> Self {
        self.gfm = enabled;
        self
    }

    /// Get parser options based on GFM configuration.
    #[must_use]
    pub fn parser_options(&self) -> Options {
        if self.gfm {
            Options::ENABLE_TABLES
                | Options::ENABLE_STRIKETHROUGH
                | Options::ENABLE_TASKLISTS
                | Options::ENABLE_FOOTNOTES
                | Options::ENABLE_HEADING_ATTRIBUTES
                | Options::ENABLE_GFM
        } else {
            Options::empty()
        }
    }

    /// Create a configured parser for the given markdown text.
    #[must_use]
    pub fn create_parser<'a>(&self, markdown: &'a str) -> Parser<'a> {
        Parser::new_ext(markdown, self.parser_options())
    }

    /// Parse and render markdown text.
    ///
    /// # Errors
    ///
    /// Returns the first component error encountered.
    pub fn render_markdown(&self, markdown: &str, scope: &Scope) -> Result<Node, ComponentError> {
        self.render(self.create_parser(markdown), scope)
    }

    /// Render an event stream.
    ///
    /// # Errors
    ///
    /// Returns the first component error encountered; rendering stops there.
    pub fn render<'a, I>(&self, events: I, scope: &Scope) -> Result<Node, ComponentError>
    where
        I: Iterator<Item = Event<'a>>,
    {
        let mut builder = TreeBuilder::new(&self.resolver, scope);
        for event in events {
            builder.event(event)?;
        }
        let blocks = builder.finish()?;
        self.resolver.render(
            WRAPPER_TAG,
            PropertyBag::with_children_only(blocks),
            scope,
        )
    }
}

/// An element whose children are still being collected.
struct Frame {
    /// `None` for containers that add no element of their own.
    tag: Option<String>,
    props: PropertyBag,
    children: Vec<Node>,
    /// Opened alongside its parent frame and closed with it.
    synthetic: bool,
    /// Children become the `alt` attribute instead of a payload.
    alt_text: bool,
    /// Content is dropped (front matter).
    discard: bool,
}

impl Frame {
    fn element(tag: impl Into<String>, props: PropertyBag) -> Self {
        Self {
            tag: Some(tag.into()),
            props,
            children: Vec::new(),
            synthetic: false,
            alt_text: false,
            discard: false,
        }
    }

    fn transparent() -> Self {
        Self {
            tag: None,
            ..Self::element("", PropertyBag::new())
        }
    }

    fn synthetic(mut self) -> Self {
        self.synthetic = true;
        self
    }
}

struct TreeBuilder<'r> {
    resolver: &'r ElementResolver,
    scope: &'r Scope,
    stack: Vec<Frame>,
    root: Vec<Node>,
    alignments: Vec<Alignment>,
    cell_index: usize,
}

impl<'r> TreeBuilder<'r> {
    fn new(resolver: &'r ElementResolver, scope: &'r Scope) -> Self {
        Self {
            resolver,
            scope,
            stack: Vec::new(),
            root: Vec::new(),
            alignments: Vec::new(),
            cell_index: 0,
        }
    }

    fn event(&mut self, event: Event<'_>) -> Result<(), ComponentError> {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(_) => self.end_tag()?,
            Event::Text(text) => self.push(Node::text(text.into_string())),
            Event::Code(code) => {
                self.leaf("inlineCode", PropertyBag::new().with_child(code.into_string()))?;
            }
            Event::InlineMath(math) => {
                self.leaf("inlineMath", PropertyBag::new().with_child(math.into_string()))?;
            }
            Event::DisplayMath(math) => {
                self.leaf("math", PropertyBag::new().with_child(math.into_string()))?;
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                self.push(Node::raw(html.into_string()));
            }
            Event::FootnoteReference(label) => self.leaf(
                "footnoteReference",
                PropertyBag::new().with_attr("label", label.into_string()),
            )?,
            Event::SoftBreak => self.push(Node::text("\n")),
            Event::HardBreak => self.leaf("br", PropertyBag::new())?,
            Event::Rule => self.leaf("thematicBreak", PropertyBag::new())?,
            Event::TaskListMarker(checked) => self.leaf(
                "input",
                PropertyBag::new()
                    .with_attr("type", "checkbox")
                    .with_attr("checked", checked)
                    .with_attr("disabled", true),
            )?,
        }
        Ok(())
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => self.open("p", PropertyBag::new()),
            Tag::Heading {
                level,
                id,
                classes,
                attrs,
            } => {
                let mut props = PropertyBag::new();
                if let Some(id) = id {
                    props.set_attr("id", id.into_string());
                }
                if !classes.is_empty() {
                    let joined: Vec<&str> = classes.iter().map(|class| &**class).collect();
                    props.set_attr("className", joined.join(" "));
                }
                for (key, value) in attrs {
                    if is_reserved(&key) {
                        tracing::debug!(key = &*key, "Ignoring reserved heading attribute");
                        continue;
                    }
                    props.set_attr(
                        key.into_string(),
                        value.map(CowStr::into_string).unwrap_or_default(),
                    );
                }
                self.open(format!("h{}", heading_level_to_num(level)), props);
            }
            Tag::BlockQuote(kind) => {
                let mut props = PropertyBag::new();
                if let Some(kind) = kind {
                    props.set_attr("kind", alert_name(kind));
                }
                self.open("blockquote", props);
            }
            Tag::CodeBlock(kind) => {
                let mut code = PropertyBag::new();
                if let CodeBlockKind::Fenced(info) = &kind {
                    let (lang, meta) = split_fence_info(info);
                    if let Some(lang) = lang {
                        code.set_attr("className", format!("language-{lang}"));
                    }
                    if let Some(meta) = meta {
                        code.set_attr("metastring", meta);
                    }
                }
                self.open("pre", PropertyBag::new());
                self.stack.push(Frame::element("code", code).synthetic());
            }
            Tag::List(Some(start)) => {
                let mut props = PropertyBag::new();
                if start != 1 {
                    props.set_attr("start", start);
                }
                self.open("ol", props);
            }
            Tag::List(None) => self.open("ul", PropertyBag::new()),
            Tag::Item => self.open("li", PropertyBag::new()),
            Tag::FootnoteDefinition(label) => self.open(
                "footnoteDefinition",
                PropertyBag::new().with_attr("label", label.into_string()),
            ),
            Tag::HtmlBlock => self.stack.push(Frame::transparent()),
            Tag::MetadataBlock(_) => self.stack.push(Frame {
                discard: true,
                ..Frame::transparent()
            }),
            Tag::DefinitionList => self.open("dl", PropertyBag::new()),
            Tag::DefinitionListTitle => self.open("dt", PropertyBag::new()),
            Tag::DefinitionListDefinition => self.open("dd", PropertyBag::new()),
            Tag::Table(alignments) => {
                self.alignments = alignments;
                self.open("table", PropertyBag::new());
            }
            Tag::TableHead => {
                self.cell_index = 0;
                self.open("thead", PropertyBag::new());
                self.stack
                    .push(Frame::element("tr", PropertyBag::new()).synthetic());
            }
            Tag::TableRow => {
                self.cell_index = 0;
                // Body rows share one tbody, closed together with the table.
                if self.parent_tag() == Some("table") {
                    self.stack
                        .push(Frame::element("tbody", PropertyBag::new()).synthetic());
                }
                self.open("tr", PropertyBag::new());
            }
            Tag::TableCell => {
                let in_head = self
                    .stack
                    .iter()
                    .any(|frame| frame.tag.as_deref() == Some("thead"));
                let mut props = PropertyBag::new();
                let align = self
                    .alignments
                    .get(self.cell_index)
                    .and_then(|a| alignment_name(*a));
                if let Some(align) = align {
                    props.set_attr("align", align);
                }
                self.cell_index += 1;
                self.open(if in_head { "th" } else { "td" }, props);
            }
            Tag::Emphasis => self.open("em", PropertyBag::new()),
            Tag::Strong => self.open("strong", PropertyBag::new()),
            Tag::Strikethrough => self.open("delete", PropertyBag::new()),
            Tag::Superscript => self.open("sup", PropertyBag::new()),
            Tag::Subscript => self.open("sub", PropertyBag::new()),
            Tag::Link {
                link_type,
                dest_url,
                title,
                ..
            } => {
                let href = if link_type == LinkType::Email {
                    format!("mailto:{dest_url}")
                } else {
                    dest_url.into_string()
                };
                let mut props = PropertyBag::new().with_attr("href", href);
                if !title.is_empty() {
                    props.set_attr("title", title.into_string());
                }
                self.open("a", props);
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                let mut props = PropertyBag::new().with_attr("src", dest_url.into_string());
                if !title.is_empty() {
                    props.set_attr("title", title.into_string());
                }
                self.stack.push(Frame {
                    alt_text: true,
                    ..Frame::element("img", props)
                });
            }
        }
    }

    /// Close the innermost event-level frame along with its synthetic children.
    fn end_tag(&mut self) -> Result<(), ComponentError> {
        while let Some(frame) = self.stack.pop() {
            let synthetic = frame.synthetic;
            self.close(frame)?;
            if !synthetic {
                break;
            }
        }
        Ok(())
    }

    fn open(&mut self, tag: impl Into<String>, props: PropertyBag) {
        self.stack.push(Frame::element(tag, props));
    }

    fn close(&mut self, frame: Frame) -> Result<(), ComponentError> {
        if frame.discard {
            return Ok(());
        }
        let Some(tag) = frame.tag else {
            for child in frame.children {
                self.push(child);
            }
            return Ok(());
        };

        let mut props = frame.props;
        if frame.alt_text {
            let alt: String = frame.children.iter().map(Node::text_content).collect();
            props.set_attr("alt", alt);
        } else {
            props = props.with_children(frame.children);
        }

        let node = self.render(&tag, props)?;
        self.push(node);
        Ok(())
    }

    /// Render an element that has no markdown children of its own.
    fn leaf(&mut self, tag: &str, props: PropertyBag) -> Result<(), ComponentError> {
        let node = self.render(tag, props)?;
        self.push(node);
        Ok(())
    }

    fn render(&self, tag: &str, props: PropertyBag) -> Result<Node, ComponentError> {
        let props = match self.parent_tag() {
            Some(parent) => props.with_parent_name(parent),
            None => props,
        };
        self.resolver.render(tag, props, self.scope)
    }

    /// Tag of the nearest enclosing element frame.
    fn parent_tag(&self) -> Option<&str> {
        self.stack.iter().rev().find_map(|frame| frame.tag.as_deref())
    }

    fn push(&mut self, node: Node) {
        match self.stack.last_mut() {
            Some(frame) => frame.children.push(node),
            None => self.root.push(node),
        }
    }

    /// Close anything left open by a truncated event stream.
    fn finish(mut self) -> Result<Vec<Node>, ComponentError> {
        while let Some(frame) = self.stack.pop() {
            self.close(frame)?;
        }
        Ok(self.root)
    }
}

fn alert_name(kind: BlockQuoteKind) -> &'static str {
    match kind {
        BlockQuoteKind::Note => "note",
        BlockQuoteKind::Tip => "tip",
        BlockQuoteKind::Important => "important",
        BlockQuoteKind::Warning => "warning",
        BlockQuoteKind::Caution => "caution",
    }
}

fn alignment_name(alignment: Alignment) -> Option<&'static str> {
    match alignment {
        Alignment::None => None,
        Alignment::Left => Some("left"),
        Alignment::Center => Some("center"),
        Alignment::Right => Some("right"),
    }
}
