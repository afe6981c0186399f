//! Part-tree flattening.

use crate::error::{Error, Result};
use crate::message::{Message, MessagePart};

/// Collects the leaf parts of a message in depth-first order.
///
/// Containers (parts with children) are descended into and never returned
/// themselves. A payload without children but with a `body` is treated as a
/// single leaf.
///
/// # Errors
///
/// Returns [`Error::NoRenderableContent`] if the message has no payload, or
/// the payload has neither parts nor a body.
pub fn flatten_parts(message: &Message) -> Result<Vec<&MessagePart>> {
    let payload = message.payload.as_ref().ok_or(Error::NoRenderableContent)?;

    if !payload.is_container() {
        return if payload.body.is_some() {
            Ok(vec![payload])
        } else {
            Err(Error::NoRenderableContent)
        };
    }

    let mut leaves = Vec::new();
    collect_leaves(payload, &mut leaves);
    Ok(leaves)
}

fn collect_leaves<'a>(part: &'a MessagePart, leaves: &mut Vec<&'a MessagePart>) {
    if part.is_container() {
        for child in &part.parts {
            collect_leaves(child, leaves);
        }
    } else {
        leaves.push(part);
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;
    use crate::message::MessagePartBody;

    fn leaf(mime_type: &str, part_id: &str) -> MessagePart {
        MessagePart {
            part_id: Some(part_id.to_string()),
            mime_type: mime_type.to_string(),
            body: Some(MessagePartBody {
                data: Some("SGk=".to_string()),
                size: 2,
                ..MessagePartBody::default()
            }),
            ..MessagePart::default()
        }
    }

    fn container(mime_type: &str, parts: Vec<MessagePart>) -> MessagePart {
        MessagePart {
            mime_type: mime_type.to_string(),
            parts,
            ..MessagePart::default()
        }
    }

    fn message(payload: Option<MessagePart>) -> Message {
        Message {
            id: "m".to_string(),
            payload,
            ..Message::default()
        }
    }

    #[test]
    fn test_flatten_nested_depth_first() {
        let payload = container(
            "multipart/mixed",
            vec![
                container(
                    "multipart/alternative",
                    vec![leaf("text/plain", "0.0"), leaf("text/html", "0.1")],
                ),
                leaf("image/jpeg", "1"),
            ],
        );
        let message = message(Some(payload));

        let ids: Vec<_> = flatten_parts(&message)
            .unwrap()
            .iter()
            .map(|p| p.part_id.clone().unwrap())
            .collect();
        assert_eq!(ids, vec!["0.0", "0.1", "1"]);
    }

    #[test]
    fn test_flatten_single_part_payload() {
        let message = message(Some(leaf("text/html", "")));
        let leaves = flatten_parts(&message).unwrap();
        assert_eq!(leaves.len(), 1);
        assert_eq!(leaves[0].mime_type, "text/html");
    }

    #[test]
    fn test_flatten_empty_parts_with_body_is_leaf() {
        let mut payload = leaf("text/html", "0");
        payload.parts = Vec::new();
        let message = message(Some(payload));
        assert_eq!(flatten_parts(&message).unwrap().len(), 1);
    }

    #[test]
    fn test_flatten_nothing_to_render() {
        let bare = message(Some(MessagePart {
            mime_type: "text/plain".to_string(),
            ..MessagePart::default()
        }));
        assert!(matches!(
            flatten_parts(&bare),
            Err(Error::NoRenderableContent)
        ));

        assert!(matches!(
            flatten_parts(&message(None)),
            Err(Error::NoRenderableContent)
        ));
    }
}
