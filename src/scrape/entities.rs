//! Literal substitution of the five predefined markup entities.

use std::borrow::Cow;

/// Entities other than `&amp;`, replaced after it.
const ENTITIES: [(&str, &str); 4] = [("&lt;", "<"), ("&gt;", ">"), ("&quot;", "\""), ("&apos;", "'")];

/// Decodes `&amp; &lt; &gt; &quot; &apos;` everywhere in `text`.
///
/// `&amp;` is replaced first so that doubly-escaped markup such as `&amp;lt;`
/// comes out as `<`. Text without any `&` is returned borrowed.
#[must_use]
pub fn decode_entities(text: &str) -> Cow<'_, str> {
    if !text.contains('&') {
        return Cow::Borrowed(text);
    }

    let mut decoded = text.replace("&amp;", "&");
    for (entity, replacement) in ENTITIES {
        if decoded.contains(entity) {
            decoded = decoded.replace(entity, replacement);
        }
    }
    Cow::Owned(decoded)
}
