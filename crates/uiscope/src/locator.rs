/*!
Best-effort XPath-style locators.

Priority: `resource-id`, then `text`, then `content-desc`, then the bare
class. The result is not guaranteed unique; there is no sibling-index
disambiguation.
*/

use crate::types::Node;

/// Locator for `node`.
///
/// ```
/// use uiscope::{locator, HierarchyTree};
///
/// let tree = HierarchyTree::from_json(r#"{
///   "name": "android.widget.Button",
///   "properties": { "resource-id": "com.app:id/btn" }
/// }"#).unwrap();
/// assert_eq!(locator::generate(tree.root()), "//*[@resource-id='com.app:id/btn']");
/// ```
pub fn generate(node: &Node) -> String {
  if let Some(id) = node.resource_id() {
    return format!("//*[@resource-id={}]", literal(id));
  }

  let class = class_step(node);
  if let Some(text) = node.text() {
    return format!("//{class}[@text={}]", literal(text));
  }
  if let Some(desc) = node.content_desc() {
    return format!("//{class}[@content-desc={}]", literal(desc));
  }
  format!("//{class}")
}

/// Quote `value` as an XPath 1.0 string literal.
///
/// XPath has no escape sequences, so the delimiter is picked to avoid the
/// value's quotes: `'v'`, else `"v"`, else a `concat()` that splices each
/// apostrophe in as `"'"`.
pub fn literal(value: &str) -> String {
  if !value.contains('\'') {
    return format!("'{value}'");
  }
  if !value.contains('"') {
    return format!("\"{value}\"");
  }
  let parts: Vec<String> = value.split('\'').map(|part| format!("'{part}'")).collect();
  format!("concat({})", parts.join(", \"'\", "))
}

/// Node-test step: the class name when it is a valid name, else `*`.
fn class_step(node: &Node) -> &str {
  node
    .class_name()
    .filter(|class| is_name_step(class))
    .unwrap_or("*")
}

/// Letters, digits, `_`, `.`, `-`, `$`, not starting with a digit, `.` or `-`.
fn is_name_step(class: &str) -> bool {
  let mut chars = class.chars();
  let Some(first) = chars.next() else {
    return false;
  };
  (first.is_alphabetic() || first == '_' || first == '$')
    && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '.' | '-' | '$'))
}
