/*!
uiscope - screenshot-to-element resolution for mobile UI inspection

Given an accessibility hierarchy dumped from a device and a screenshot of
the same moment, uiscope maps pointer positions on the displayed screenshot
to hierarchy nodes and keeps every inspector view in sync with the result.

```ignore
use uiscope::{Session, Point, Size};

let mut session = Session::builder()
    .deny_resource_id("com.tool:id/capture_overlay")
    .build();

session.load_hierarchy_json(&dump)?;
session.image_loaded(Size::new(1080.0, 1920.0));
session.container_resized(Size::new(400.0, 400.0));

// Hover and click in surface pixels
session.pointer_move(Point::new(120.0, 88.0));
let selected = session.click(Point::new(120.0, 88.0));
let locator = session.locator();

// Subscribe to events
let mut events = session.subscribe();
while let Ok(event) = events.recv().await {
    // handle event
}
```

The pieces also work standalone: [`HierarchyTree`] to parse and index a
dump, [`viewport`] for aspect-fit layout, [`hit_test`] to resolve a
normalized point, [`overlay`] to paint boxes, and [`locator`] to derive an
XPath-style locator.
*/

mod hierarchy;
mod session;

pub mod context;
pub mod hit_test;
pub mod locator;
pub mod overlay;
pub mod viewport;

mod types;
pub use types::*;

pub use crate::hierarchy::HierarchyTree;
pub use crate::hit_test::HitTestConfig;
pub use crate::session::{
  place_tooltip, NodeDetails, NullView, PropertiesPanel, Session, SessionBuilder, SessionSnapshot,
  Tooltip, TooltipContent, TooltipPlacement, TreeHighlight, TreeView, TOOLTIP_OFFSET,
};
pub use crate::viewport::ViewportState;
