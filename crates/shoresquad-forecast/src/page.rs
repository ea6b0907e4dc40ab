//! Render targets: anything whose displayed content can be swapped wholesale.

use std::path::Path;

use ego_tree::NodeId;
use scraper::{Html, Node, Selector};

/// A display surface the pipeline renders into.
///
/// Each call replaces the entire content in one assignment; callers never
/// mutate a target incrementally.
pub trait RenderTarget {
    fn replace_content(&mut self, markup: &str);
}

impl RenderTarget for String {
    fn replace_content(&mut self, markup: &str) {
        *self = markup.to_string();
    }
}

/// Elements that cannot hold content.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// A parsed HTML document whose containers can be filled with markup.
///
/// A claimed container's children are swapped for a placeholder comment;
/// serialization substitutes the container's current markup for it.
#[derive(Debug)]
pub struct HostPage {
    document: Html,
    slots: Vec<Slot>,
}

#[derive(Debug)]
struct Slot {
    node: NodeId,
    placeholder: String,
    markup: String,
}

impl HostPage {
    pub fn new(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
            slots: Vec::new(),
        }
    }

    pub fn load(path: &Path) -> std::io::Result<Self> {
        Ok(Self::new(&std::fs::read_to_string(path)?))
    }

    pub fn save(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.html())
    }

    /// The serialized document with every container's current markup.
    pub fn html(&self) -> String {
        self.slots
            .iter()
            .fold(self.document.html(), |html, slot| {
                html.replacen(&format!("<!--{}-->", slot.placeholder), &slot.markup, 1)
            })
    }

    /// The element whose `id` attribute equals `id`, or `None` when the page
    /// has no such element or it is a void element.
    pub fn container(&mut self, id: &str) -> Option<Container<'_>> {
        let index = match self.slots.iter().position(|s| self.is_slot_for(s, id)) {
            Some(index) => index,
            None => self.claim(id)?,
        };
        Some(Container {
            slot: &mut self.slots[index],
        })
    }

    fn is_slot_for(&self, slot: &Slot, id: &str) -> bool {
        self.document
            .tree
            .get(slot.node)
            .and_then(|node| node.value().as_element().and_then(|el| el.id()))
            == Some(id)
    }

    fn claim(&mut self, id: &str) -> Option<usize> {
        if id.is_empty() {
            return None;
        }
        let with_id = Selector::parse("[id]").ok()?;
        let element = self
            .document
            .select(&with_id)
            .find(|el| el.value().id() == Some(id))?;
        if VOID_ELEMENTS.contains(&element.value().name()) {
            return None;
        }

        let node = element.id();
        let markup = element.inner_html();
        let children: Vec<NodeId> = element.children().map(|child| child.id()).collect();

        let placeholder = format!("shoresquad-slot-{}", self.slots.len());
        let comment = placeholder_node(&placeholder)?;

        for child in children {
            if let Some(mut child) = self.document.tree.get_mut(child) {
                child.detach();
            }
        }
        self.document.tree.get_mut(node)?.append(comment);
        tracing::debug!("Claimed #{} as {}", id, placeholder);

        self.slots.push(Slot {
            node,
            placeholder,
            markup,
        });
        Some(self.slots.len() - 1)
    }
}

/// A comment node carrying `placeholder` as its text.
fn placeholder_node(placeholder: &str) -> Option<Node> {
    let fragment = Html::parse_fragment(&format!("<!--{}-->", placeholder));
    let comment = fragment
        .tree
        .nodes()
        .find(|node| node.value().is_comment())?;
    Some(comment.value().clone())
}

/// Inner content of one element of a [`HostPage`].
#[derive(Debug)]
pub struct Container<'p> {
    slot: &'p mut Slot,
}

impl Container<'_> {
    pub fn content(&self) -> &str {
        &self.slot.markup
    }
}

impl RenderTarget for Container<'_> {
    fn replace_content(&mut self, markup: &str) {
        self.slot.markup = markup.to_string();
    }
}
