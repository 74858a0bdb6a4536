/*!
Inspection session: the single owner of hover and selection state.

```ignore
use uiscope::{Session, Size, Point};

let mut session = Session::builder()
    .deny_resource_id("com.tool:id/capture_overlay")
    .tree_view(my_tree)
    .properties_panel(my_panel)
    .build();

session.load_hierarchy_json(&dump)?;
session.image_loaded(Size::new(1080.0, 1920.0));
session.container_resized(Size::new(400.0, 400.0));

session.pointer_move(Point::new(120.0, 88.0)); // hover
session.click(Point::new(120.0, 88.0));        // select
let locator = session.locator();
```

Every mutation that changes [`SelectionState`] fans out, in order, to the
overlay surface, the tree view, the properties panel, and the tooltip.
Transitions that leave the state as it was fan out nothing, so a view that
echoes a selection back can't loop.
*/

mod tooltip;
mod views;

pub use tooltip::{place as place_tooltip, TOOLTIP_OFFSET};
pub use views::{
  NodeDetails, NullView, PropertiesPanel, TooltipContent, TooltipPlacement, Tooltip, TreeHighlight,
  TreeView,
};

use async_broadcast::{InactiveReceiver, Sender};
use serde::Serialize;
use serde_json::Value;
use ts_rs::TS;

use crate::context::{ElementContext, HierarchyOverview};
use crate::hierarchy::HierarchyTree;
use crate::hit_test::{self, HitTestConfig};
use crate::overlay::{self, DisplayList, Surface};
use crate::types::{Event, Node, NodeKey, Point, ScopeError, ScopeResult, SelectionState, Size};
use crate::viewport::ViewportState;

const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Serializable summary of session state.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct SessionSnapshot {
  /// Root key, if a hierarchy is loaded.
  pub root: Option<NodeKey>,
  /// Indexed nodes; 0 without a hierarchy.
  pub node_count: usize,
  /// Intrinsic screenshot size.
  pub natural: Option<Size>,
  /// Container size.
  pub container: Option<Size>,
  /// Rendered screenshot size.
  pub display: Option<Size>,
  /// Hovered and selected keys.
  pub selection: SelectionState,
  /// Active hit-test tunables.
  pub config: HitTestConfig,
}

/// Builder for configuring a [`Session`].
///
/// Views left unset ignore updates; the overlay defaults to a [`DisplayList`].
#[derive(Default)]
#[must_use = "Builder does nothing until .build() is called"]
pub struct SessionBuilder {
  config: HitTestConfig,
  surface: Option<Box<dyn Surface>>,
  tree_view: Option<Box<dyn TreeView>>,
  properties: Option<Box<dyn PropertiesPanel>>,
  tooltip: Option<Box<dyn Tooltip>>,
}

impl std::fmt::Debug for SessionBuilder {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SessionBuilder")
      .field("config", &self.config)
      .finish_non_exhaustive()
  }
}

impl SessionBuilder {
  /// Never let a node with this `resource-id` win a hit test.
  ///
  /// For full-screen capture overlays that sit above the real UI.
  pub fn deny_resource_id(mut self, id: impl Into<String>) -> Self {
    self.config.denylist.push(id.into());
    self
  }

  /// Area tolerance for the richness tie-break. Default: [`hit_test::AREA_EPSILON`].
  pub fn area_epsilon(mut self, epsilon: f64) -> Self {
    self.config.area_epsilon = epsilon;
    self
  }

  /// Replace the whole hit-test configuration.
  pub fn hit_test_config(mut self, config: HitTestConfig) -> Self {
    self.config = config;
    self
  }

  /// Overlay drawing target.
  pub fn surface(mut self, surface: impl Surface + 'static) -> Self {
    self.surface = Some(Box::new(surface));
    self
  }

  /// Hierarchy tree panel.
  pub fn tree_view(mut self, view: impl TreeView + 'static) -> Self {
    self.tree_view = Some(Box::new(view));
    self
  }

  /// Properties panel and locator field.
  pub fn properties_panel(mut self, view: impl PropertiesPanel + 'static) -> Self {
    self.properties = Some(Box::new(view));
    self
  }

  /// Pointer tooltip.
  pub fn tooltip(mut self, view: impl Tooltip + 'static) -> Self {
    self.tooltip = Some(Box::new(view));
    self
  }

  /// Build the session.
  pub fn build(self) -> Session {
    let (mut tx, rx) = async_broadcast::broadcast(EVENT_CHANNEL_CAPACITY);
    tx.set_overflow(true); // Drop oldest messages when full

    Session {
      tree: None,
      viewport: ViewportState::new(),
      selection: SelectionState::default(),
      config: self.config,
      pointer: None,
      surface: self
        .surface
        .unwrap_or_else(|| Box::new(DisplayList::default())),
      tree_view: self.tree_view.unwrap_or_else(|| Box::new(NullView)),
      properties: self.properties.unwrap_or_else(|| Box::new(NullView)),
      tooltip: self.tooltip.unwrap_or_else(|| Box::new(NullView)),
      events_tx: tx,
      events_keepalive: rx.deactivate(),
    }
  }
}

/// Hierarchy, viewport, selection, and the views they drive.
pub struct Session {
  tree: Option<HierarchyTree>,
  viewport: ViewportState,
  selection: SelectionState,
  config: HitTestConfig,
  /// Last pointer position on the surface, while the pointer is over it.
  pointer: Option<Point>,
  surface: Box<dyn Surface>,
  tree_view: Box<dyn TreeView>,
  properties: Box<dyn PropertiesPanel>,
  tooltip: Box<dyn Tooltip>,
  events_tx: Sender<Event>,
  events_keepalive: InactiveReceiver<Event>,
}

impl std::fmt::Debug for Session {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Session")
      .field("tree", &self.tree)
      .field("viewport", &self.viewport)
      .field("selection", &self.selection)
      .finish_non_exhaustive()
  }
}

impl Default for Session {
  fn default() -> Self {
    Self::new()
  }
}

impl Session {
  /// Session with default configuration and no views attached.
  pub fn new() -> Self {
    Self::builder().build()
  }

  /// Start configuring a session.
  pub fn builder() -> SessionBuilder {
    SessionBuilder::default()
  }

  /// Subscribe to state-change events.
  pub fn subscribe(&self) -> async_broadcast::Receiver<Event> {
    self.events_keepalive.activate_cloned()
  }

  fn emit(&self, event: Event) {
    if let Err(e) = self.events_tx.try_broadcast(event) {
      if e.is_full() {
        log::error!("Event channel overflow - events are being dropped.");
      }
    }
  }

  // ==========================================================================
  // Hierarchy
  // ==========================================================================

  /// Replace the hierarchy with a freshly fetched document.
  ///
  /// The selection always clears: keys from the previous snapshot mean
  /// nothing in the new one. On failure the session is left without a tree
  /// and hit-testing matches nothing until the next successful load.
  pub fn load_hierarchy(&mut self, raw: &Value) -> ScopeResult<()> {
    self.install(HierarchyTree::build(raw))
  }

  /// [`load_hierarchy`](Self::load_hierarchy) from JSON text.
  pub fn load_hierarchy_json(&mut self, text: &str) -> ScopeResult<()> {
    self.install(HierarchyTree::from_json(text))
  }

  fn install(&mut self, built: ScopeResult<HierarchyTree>) -> ScopeResult<()> {
    self.drop_selection();
    let result = match built {
      Ok(tree) => {
        log::debug!(
          "hierarchy loaded: root {} with {} nodes",
          tree.root().key,
          tree.node_count()
        );
        self.emit(Event::HierarchyLoaded {
          root: tree.root().key.clone(),
          node_count: tree.node_count(),
        });
        self.tree = Some(tree);
        Ok(())
      }
      Err(err) => {
        log::warn!("hierarchy unavailable: {err}");
        self.tree = None;
        self.emit(Event::HierarchyUnavailable {
          reason: err.to_string(),
        });
        Err(err)
      }
    };
    self.fan_out(None);
    result
  }

  /// Drop the hierarchy and the selection.
  pub fn clear_hierarchy(&mut self) {
    self.tree = None;
    self.drop_selection();
    self.emit(Event::HierarchyCleared);
    self.fan_out(None);
  }

  // ==========================================================================
  // Layout
  // ==========================================================================

  /// The screenshot finished decoding at `natural` pixels.
  pub fn image_loaded(&mut self, natural: Size) -> bool {
    let changed = self.viewport.image_loaded(natural);
    self.after_layout(changed);
    changed
  }

  /// The container holding the screenshot was resized.
  pub fn container_resized(&mut self, container: Size) -> bool {
    let changed = self.viewport.container_resized(container);
    self.after_layout(changed);
    changed
  }

  fn after_layout(&mut self, changed: bool) {
    if changed {
      log::debug!("display size now {:?}", self.viewport.display());
      self.emit(Event::ViewportChanged {
        display: self.viewport.display(),
      });
      self.redraw();
    }
  }

  // ==========================================================================
  // Pointer input (surface pixels)
  // ==========================================================================

  /// Hover whatever is under the pointer. Returns the hovered key.
  ///
  /// Ignored until there is both a tree and a layout.
  pub fn pointer_move(&mut self, pointer: Point) -> Option<NodeKey> {
    if !self.can_hit_test() {
      return self.selection.hovered.clone();
    }
    self.pointer = Some(pointer);
    let key = self.hit(pointer);
    if !self.hover(key.clone()) {
      self.update_tooltip(key.as_ref());
    }
    key
  }

  /// The pointer left the surface.
  pub fn pointer_leave(&mut self) {
    self.pointer = None;
    if !self.hover(None) {
      self.tooltip.hide();
    }
  }

  /// Select whatever is under the pointer. A click that hits nothing clears
  /// the selection.
  ///
  /// Ignored until there is both a tree and a layout.
  pub fn click(&mut self, pointer: Point) -> Option<NodeKey> {
    if !self.can_hit_test() {
      return self.selection.selected.clone();
    }
    self.pointer = Some(pointer);
    let key = self.hit(pointer);
    self.set_selected(key.clone(), key.clone());
    key
  }

  fn can_hit_test(&self) -> bool {
    self.tree.is_some() && self.viewport.is_ready()
  }

  fn hit(&self, pointer: Point) -> Option<NodeKey> {
    let tree = self.tree.as_ref()?;
    let point = self.viewport.normalize(pointer)?;
    hit_test::resolve(tree.root(), point, &self.config).map(|node| node.key.clone())
  }

  // ==========================================================================
  // Selection
  // ==========================================================================

  /// Set the hovered node. Unknown keys hover nothing.
  ///
  /// Returns `false` (and updates no view) when nothing changed.
  pub fn hover(&mut self, key: Option<NodeKey>) -> bool {
    let key = self.known(key);
    if self.selection.hovered == key {
      return false;
    }
    self.selection.hovered.clone_from(&key);
    self.emit(Event::Hovered { key: key.clone() });
    self.fan_out(key.as_ref());
    true
  }

  /// Set the selected node. Unknown keys select nothing.
  ///
  /// Returns `false` (and updates no view) when nothing changed.
  pub fn select(&mut self, key: Option<NodeKey>) -> bool {
    let key = self.known(key);
    self.set_selected(key.clone(), key)
  }

  /// Select from the tree view. Unlike [`select`](Self::select), an unknown
  /// key is an error.
  pub fn select_key(&mut self, key: &NodeKey) -> ScopeResult<bool> {
    match &self.tree {
      Some(tree) => tree.get(key)?,
      None => return Err(ScopeError::NodeNotFound(key.clone())),
    };
    let tooltip = self.selection.hovered.clone();
    Ok(self.set_selected(Some(key.clone()), tooltip))
  }

  /// Clear both hover and selection.
  pub fn clear_selection(&mut self) -> bool {
    if !self.drop_selection() {
      return false;
    }
    self.fan_out(None);
    true
  }

  /// Clear hover and selection, announcing each part that was set. No fan-out.
  fn drop_selection(&mut self) -> bool {
    if self.selection == SelectionState::default() {
      return false;
    }
    if self.selection.hovered.is_some() {
      self.emit(Event::Hovered { key: None });
    }
    if self.selection.selected.is_some() {
      self.emit(Event::Selected {
        key: None,
        locator: None,
      });
    }
    self.selection.clear();
    true
  }

  fn set_selected(&mut self, key: Option<NodeKey>, tooltip: Option<NodeKey>) -> bool {
    if self.selection.selected == key {
      return false;
    }
    self.selection.selected.clone_from(&key);
    let locator = self.selected_node().map(crate::locator::generate);
    log::debug!("selected {key:?}");
    self.emit(Event::Selected { key, locator });
    self.fan_out(tooltip.as_ref());
    true
  }

  fn known(&self, key: Option<NodeKey>) -> Option<NodeKey> {
    key.filter(|key| {
      let found = self.tree.as_ref().is_some_and(|tree| tree.contains(key));
      if !found {
        log::warn!("ignoring unknown node key {key}");
      }
      found
    })
  }

  // ==========================================================================
  // Fan-out
  // ==========================================================================

  /// Push the full current state to every view.
  pub fn render(&mut self) {
    let hovered = self.selection.hovered.clone();
    self.fan_out(hovered.as_ref());
  }

  /// Overlay, tree view, properties panel, tooltip. Always in that order.
  fn fan_out(&mut self, tooltip: Option<&NodeKey>) {
    self.redraw();
    self.tree_view.highlight(&self.tree_highlight());
    let details = self.focused_node().map(NodeDetails::of);
    self.properties.show(details.as_ref());
    self.update_tooltip(tooltip);
  }

  fn redraw(&mut self) {
    overlay::redraw(
      self.surface.as_mut(),
      self.tree.as_ref(),
      &self.viewport,
      &self.selection,
    );
  }

  fn tree_highlight(&self) -> TreeHighlight {
    let expand = self
      .selection
      .selected
      .as_ref()
      .zip(self.tree.as_ref())
      .and_then(|(key, tree)| tree.path_to(key))
      .map(|mut path| {
        path.pop();
        path
      })
      .unwrap_or_default();
    TreeHighlight {
      selected: self.selection.selected.clone(),
      hovered: self.selection.hovered.clone(),
      expand,
    }
  }

  fn update_tooltip(&mut self, key: Option<&NodeKey>) {
    match self.tooltip_placement(key) {
      Some(placement) => self.tooltip.show(&placement),
      None => self.tooltip.hide(),
    }
  }

  fn tooltip_placement(&self, key: Option<&NodeKey>) -> Option<TooltipPlacement> {
    let pointer = self.pointer?;
    let node = self.tree.as_ref()?.lookup(key?)?;
    let bounds = self
      .viewport
      .container()
      .filter(Size::is_usable)
      .or_else(|| self.viewport.display())?;
    let content = TooltipContent::of(node);
    let position = tooltip::place(pointer, self.tooltip.measure(&content), bounds);
    Some(TooltipPlacement { content, position })
  }

  // ==========================================================================
  // Queries
  // ==========================================================================

  /// Loaded hierarchy.
  pub const fn tree(&self) -> Option<&HierarchyTree> {
    self.tree.as_ref()
  }

  /// Screenshot layout.
  pub const fn viewport(&self) -> &ViewportState {
    &self.viewport
  }

  /// Hovered and selected keys.
  pub const fn selection(&self) -> &SelectionState {
    &self.selection
  }

  /// Hit-test tunables.
  pub const fn config(&self) -> &HitTestConfig {
    &self.config
  }

  /// Update hit-test tunables. Takes effect on the next pointer event.
  pub fn configure(&mut self, config: HitTestConfig) {
    log::debug!("hit-test config updated: {config:?}");
    self.config = config;
  }

  fn node(&self, key: Option<&NodeKey>) -> Option<&Node> {
    self.tree.as_ref()?.lookup(key?)
  }

  fn selected_node(&self) -> Option<&Node> {
    self.node(self.selection.selected.as_ref())
  }

  /// The node the properties panel describes: selected, else hovered.
  pub fn focused_node(&self) -> Option<&Node> {
    self.node(self.selection.focus())
  }

  /// Locator for the focused node.
  pub fn locator(&self) -> Option<String> {
    self.focused_node().map(crate::locator::generate)
  }

  /// Assistant payload for the focused node.
  pub fn element_context(&self) -> Option<ElementContext> {
    self
      .focused_node()
      .map(|node| ElementContext::from_node(node, &self.viewport))
  }

  /// Summary of the loaded hierarchy.
  pub fn overview(&self) -> Option<HierarchyOverview> {
    self.tree.as_ref().map(HierarchyOverview::of)
  }

  /// Serializable summary of the current state.
  pub fn snapshot(&self) -> SessionSnapshot {
    SessionSnapshot {
      root: self.tree.as_ref().map(|tree| tree.root().key.clone()),
      node_count: self.tree.as_ref().map_or(0, HierarchyTree::node_count),
      natural: self.viewport.natural(),
      container: self.viewport.container(),
      display: self.viewport.display(),
      selection: self.selection.clone(),
      config: self.config.clone(),
    }
  }
}
