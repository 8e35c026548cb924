//! List assembly
//!
//! Turns a run of consecutive list-item lines into `List` nodes. An ordered
//! item opening with a bold lead-in (`**Title:** body`) may own one nested
//! unordered list made of the dash lines that follow it. Anything nested
//! deeper, numbered or not, is folded into the previous item's text.

use super::blocks::ListLine;
use super::elements::{List, ListItem, Node};
use super::inline::{append_line, InlineTransformer};

/// A list being built, plus the nested list of its last item if one is open
struct OpenList {
    list: List,
    /// Indent of the list's first line; deeper lines are flattened
    indent: usize,
    nested: Option<OpenNested>,
    /// Whether the last item may own a nested list
    lead_in: bool,
}

struct OpenNested {
    list: List,
    indent: usize,
}

impl OpenList {
    fn start(line: &ListLine<'_>) -> Self {
        Self {
            list: List::new(line.ordered, if line.ordered { line.number } else { None }),
            indent: line.indent,
            nested: None,
            lead_in: false,
        }
    }

    fn push_item(&mut self, children: Vec<Node>) {
        self.close_nested();
        self.lead_in = self.list.ordered && has_bold_lead_in(&children);
        self.list.items.push(ListItem::new(children));
    }

    /// Attach the open nested list to the item that owns it
    fn close_nested(&mut self) {
        if let Some(nested) = self.nested.take() {
            if let Some(owner) = self.list.items.last_mut() {
                owner.nested = Some(nested.list);
            }
        }
    }

    fn finish(mut self) -> Node {
        self.close_nested();
        Node::List(self.list)
    }
}

/// Assemble a run of list-item lines into one or more lists
///
/// A new list starts whenever a line neither continues the current list's
/// kind nor qualifies as a nested sub-item.
pub(crate) fn assemble(
    lines: &[ListLine<'_>],
    inline: &mut InlineTransformer<'_>,
) -> Vec<Node> {
    let mut lists = Vec::new();
    let mut current: Option<OpenList> = None;

    for line in lines {
        let children = inline.transform(line.text);

        let Some(open) = current.as_mut() else {
            let mut open = OpenList::start(line);
            open.push_item(children);
            current = Some(open);
            continue;
        };

        if line.ordered {
            if line.indent > open.indent {
                // Numbered lines nested under any item fold into the innermost one
                match open.nested.as_mut() {
                    Some(nested) => flatten_into_last(&mut nested.list, children),
                    None => flatten_into_last(&mut open.list, children),
                }
            } else if open.list.ordered {
                open.push_item(children);
            } else {
                restart(&mut lists, &mut current, line, children);
            }
            continue;
        }

        // Unordered line
        if !open.list.ordered {
            if line.indent > open.indent {
                flatten_into_last(&mut open.list, children);
            } else {
                open.push_item(children);
            }
        } else if let Some(nested) = open.nested.as_mut() {
            if line.indent > nested.indent {
                flatten_into_last(&mut nested.list, children);
            } else {
                nested.list.items.push(ListItem::new(children));
            }
        } else if open.lead_in {
            let mut list = List::new(false, None);
            list.items.push(ListItem::new(children));
            open.nested = Some(OpenNested {
                list,
                indent: line.indent,
            });
        } else {
            restart(&mut lists, &mut current, line, children);
        }
    }

    if let Some(open) = current {
        lists.push(open.finish());
    }

    lists
}

fn restart(
    lists: &mut Vec<Node>,
    current: &mut Option<OpenList>,
    line: &ListLine<'_>,
    children: Vec<Node>,
) {
    if let Some(done) = current.take() {
        lists.push(done.finish());
    }
    let mut open = OpenList::start(line);
    open.push_item(children);
    *current = Some(open);
}

fn flatten_into_last(list: &mut List, children: Vec<Node>) {
    match list.items.last_mut() {
        Some(item) => append_line(&mut item.children, children),
        None => list.items.push(ListItem::new(children)),
    }
}

/// `**Title:** body` or `**Title**: body`
fn has_bold_lead_in(children: &[Node]) -> bool {
    match children {
        [Node::Bold { children: lead }, rest @ ..] => {
            let title = lead.iter().map(Node::plain_text).collect::<String>();
            if title.trim_end().ends_with(':') {
                return true;
            }
            matches!(rest.first(), Some(Node::Text { text }) if text.starts_with(':'))
        }
        _ => false,
    }
}
