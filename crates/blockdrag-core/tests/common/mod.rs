// crates/blockdrag-core/tests/common/mod.rs
// ============================================================================
// Module: Fake Admin UI
// Description: In-process BrowserSession rendering blocks like the admin UI.
// Purpose: Exercise the drag driver, verifier, and runner without a browser.
// ============================================================================

//! Fake admin UI used by the integration tests.
//!
//! Rows are laid out top to bottom with a gap larger than the drop offset so
//! a release point always falls inside exactly one insertion zone. Moving
//! down lands after the last row whose top edge is above the release point;
//! moving up lands before the first row whose bottom edge is below it.

#![allow(
    dead_code,
    clippy::panic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::missing_panics_doc,
    reason = "Shared test helpers are not used by every test binary."
)]

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use blockdrag_core::AdminUi;
use blockdrag_core::Block;
use blockdrag_core::BoundingBox;
use blockdrag_core::BrowserError;
use blockdrag_core::BrowserSession;
use blockdrag_core::Collection;
use blockdrag_core::Credentials;
use blockdrag_core::DocId;
use blockdrag_core::Fruit;
use blockdrag_core::InMemoryDocumentStore;
use blockdrag_core::NetworkProfile;
use blockdrag_core::Point;
use blockdrag_core::Seed;
use blockdrag_core::Selector;

// ============================================================================
// SECTION: Layout
// ============================================================================

pub const ADMIN_URL: &str = "http://cms.test/admin";
pub const ROW_LEFT: f64 = 40.0;
pub const ROW_TOP: f64 = 100.0;
pub const ROW_WIDTH: f64 = 600.0;
pub const ROW_HEIGHT: f64 = 80.0;
pub const ROW_GAP: f64 = 24.0;
pub const HANDLE_INSET: f64 = 8.0;
pub const HANDLE_SIZE: f64 = 16.0;

pub fn row_box(index: usize) -> BoundingBox {
    #[allow(clippy::cast_precision_loss, reason = "Row counts in tests are tiny.")]
    let offset = index as f64 * (ROW_HEIGHT + ROW_GAP);
    BoundingBox {
        x: ROW_LEFT,
        y: ROW_TOP + offset,
        width: ROW_WIDTH,
        height: ROW_HEIGHT,
    }
}

pub fn handle_box(index: usize) -> BoundingBox {
    let row = row_box(index);
    BoundingBox {
        x: row.x + HANDLE_INSET,
        y: row.y + HANDLE_INSET,
        width: HANDLE_SIZE,
        height: HANDLE_SIZE,
    }
}

pub fn test_credentials() -> Credentials {
    Credentials {
        email: "user@example.com".to_string(),
        password: "securePassword123".to_string(),
    }
}

// ============================================================================
// SECTION: State
// ============================================================================

/// Rendering defects the fake can simulate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Defect {
    /// Renders correctly.
    #[default]
    None,
    /// Text inputs keep the values of the initial order after a move.
    StaleTextValues,
    /// Relationship labels keep the initial order after a move.
    StaleLabels,
    /// Text inputs whose stored value is unset are not rendered at all.
    UnsetInputsAbsent,
}

/// Page state captured when network emulation was switched on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThrottlePoint {
    pub on_document: bool,
    pub expanded: bool,
    pub moves: usize,
}

#[derive(Debug, Default)]
struct FakeState {
    url: String,
    logged_in: bool,
    expanded: bool,
    show_expand_button: bool,
    hang_on_expand: bool,
    email_input: String,
    password_input: String,
    credentials: Option<Credentials>,
    rows: Vec<Block>,
    initial_rows: Vec<Block>,
    pointer: Option<Point>,
    pressed: Option<usize>,
    moves: Vec<(usize, usize)>,
    move_steps: Vec<u32>,
    network: Option<NetworkProfile>,
    network_applied_at: Option<ThrottlePoint>,
    viewport_height: Option<f64>,
    closed: bool,
    defect: Defect,
}

/// In-process admin UI.
pub struct FakeAdminUi {
    ui: AdminUi,
    store: Option<Arc<InMemoryDocumentStore>>,
    state: Mutex<FakeState>,
}

impl FakeAdminUi {
    /// Signed-in page already showing `blocks`, expanded.
    pub fn with_blocks(blocks: Vec<Block>) -> Self {
        let state = FakeState {
            url: format!("{ADMIN_URL}/collections/fruits/1"),
            logged_in: true,
            expanded: true,
            show_expand_button: true,
            initial_rows: blocks.clone(),
            rows: blocks,
            ..FakeState::default()
        };
        Self {
            ui: AdminUi::default(),
            store: None,
            state: Mutex::new(state),
        }
    }

    /// Logged-out browser that loads documents from `store`.
    pub fn backed_by(store: Arc<InMemoryDocumentStore>, credentials: Credentials) -> Self {
        let state = FakeState {
            url: "about:blank".to_string(),
            show_expand_button: true,
            credentials: Some(credentials),
            ..FakeState::default()
        };
        Self {
            ui: AdminUi::default(),
            store: Some(store),
            state: Mutex::new(state),
        }
    }

    pub fn set_defect(&self, defect: Defect) {
        self.state.lock().unwrap().defect = defect;
    }

    /// Rejects pointer moves below `height`, as a real driver does.
    pub fn set_viewport_height(&self, height: f64) {
        self.state.lock().unwrap().viewport_height = Some(height);
    }

    pub fn hide_expand_button(&self) {
        self.state.lock().unwrap().show_expand_button = false;
    }

    pub fn hang_on_expand(&self) {
        self.state.lock().unwrap().hang_on_expand = true;
    }

    /// Block names in rendered order.
    pub fn rendered_names(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .rows
            .iter()
            .map(|block| block.name().unwrap_or_default().to_string())
            .collect()
    }

    pub fn moves(&self) -> Vec<(usize, usize)> {
        self.state.lock().unwrap().moves.clone()
    }

    pub fn move_steps(&self) -> Vec<u32> {
        self.state.lock().unwrap().move_steps.clone()
    }

    pub fn network(&self) -> Option<NetworkProfile> {
        self.state.lock().unwrap().network.clone()
    }

    pub fn network_applied_at(&self) -> Option<ThrottlePoint> {
        self.state.lock().unwrap().network_applied_at.clone()
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().unwrap().closed
    }

    fn on_document(state: &FakeState) -> bool {
        state.logged_in && state.url.starts_with(&format!("{ADMIN_URL}/collections/fruits/"))
    }

    fn load_document(&self, state: &mut FakeState, id: &str) {
        let Some(store) = &self.store else {
            return;
        };
        let id = id.parse::<u64>().map_or_else(|_| DocId::new(id), DocId::Number);
        let Some(value) = store.get(Collection::Fruits, &id) else {
            state.rows.clear();
            return;
        };
        let fruit: Fruit = serde_json::from_value(value).unwrap();
        let mut lookup = BTreeMap::new();
        let mut blocks = fruit.blocks;
        for block in &blocks {
            for seed_ref in block.seeds() {
                let seed_value = store.get(Collection::Seeds, seed_ref.id()).unwrap();
                let seed: Seed = serde_json::from_value(seed_value).unwrap();
                lookup.insert(seed.id.clone(), seed);
            }
        }
        for block in &mut blocks {
            block.resolve_seeds(&lookup).unwrap();
        }
        state.initial_rows = blocks.clone();
        state.rows = blocks;
        state.expanded = false;
    }

    /// Resolves a selector to the element box it addresses.
    fn element_box(&self, state: &FakeState, selector: &Selector) -> Option<BoundingBox> {
        if *selector == self.ui.login_email() || *selector == self.ui.login_password() {
            return state.url.ends_with("/login").then_some(row_box(0));
        }
        if *selector == self.ui.login_submit() {
            return state.url.ends_with("/login").then_some(row_box(1));
        }
        if *selector == self.ui.dashboard_marker() {
            let on_dashboard = state.logged_in && state.url == ADMIN_URL;
            return on_dashboard.then_some(row_box(0));
        }
        if !Self::on_document(state) {
            return None;
        }
        if *selector == self.ui.field_container() {
            return Some(row_box(0));
        }
        if *selector == self.ui.expand_all() {
            return state.show_expand_button.then_some(handle_box(0));
        }
        if *selector == self.ui.first_drag_handle() {
            return (!state.rows.is_empty()).then(|| handle_box(0));
        }
        for index in 0 .. state.rows.len() {
            if *selector == self.ui.row(index) {
                return Some(row_box(index));
            }
            if *selector == self.ui.drag_handle(index) {
                return Some(handle_box(index));
            }
        }
        None
    }

    fn text_value(&self, state: &FakeState, selector: &Selector) -> Option<String> {
        if !state.expanded || !Self::on_document(state) {
            return None;
        }
        let rows = match state.defect {
            Defect::StaleTextValues => &state.initial_rows,
            Defect::None | Defect::StaleLabels | Defect::UnsetInputsAbsent => &state.rows,
        };
        for (index, block) in rows.iter().enumerate() {
            for field in block.visible_text_fields() {
                if *selector == self.ui.text_input(index, field.path) {
                    if state.defect == Defect::UnsetInputsAbsent && field.value.is_none() {
                        return None;
                    }
                    return Some(field.value.unwrap_or_default().to_string());
                }
            }
        }
        None
    }

    fn labels(&self, state: &FakeState, selector: &Selector) -> Vec<String> {
        if !state.expanded || !Self::on_document(state) {
            return Vec::new();
        }
        let rows = match state.defect {
            Defect::StaleLabels => &state.initial_rows,
            Defect::None | Defect::StaleTextValues | Defect::UnsetInputsAbsent => &state.rows,
        };
        for (index, block) in rows.iter().enumerate() {
            if *selector == self.ui.relationship_labels(index, block.seed_field()) {
                return block
                    .seeds()
                    .iter()
                    .map(|seed| seed.name().unwrap_or_default().to_string())
                    .collect();
            }
        }
        Vec::new()
    }
}

/// Applies a drop of row `source` released at `point`.
fn drop_target(rows: usize, source: usize, point: Point) -> usize {
    let source_box = row_box(source);
    if source_box.contains(point) {
        return source;
    }
    if point.y > source_box.y {
        (0 .. rows).rev().find(|index| row_box(*index).y <= point.y).unwrap_or(source)
    } else {
        (0 .. rows).find(|index| row_box(*index).bottom() >= point.y).unwrap_or(source)
    }
}

// ============================================================================
// SECTION: BrowserSession
// ============================================================================

#[async_trait]
impl BrowserSession for FakeAdminUi {
    async fn goto(&self, url: &str) -> Result<(), BrowserError> {
        let mut state = self.state.lock().unwrap();
        let document_prefix = format!("{ADMIN_URL}/collections/fruits/");
        if let Some(id) = url.strip_prefix(&document_prefix) {
            if !state.logged_in {
                state.url = format!("{ADMIN_URL}/login");
                return Ok(());
            }
            let id = id.to_string();
            self.load_document(&mut state, &id);
        }
        state.url = url.to_string();
        Ok(())
    }

    async fn current_url(&self) -> Result<String, BrowserError> {
        Ok(self.state.lock().unwrap().url.clone())
    }

    async fn click(&self, selector: &Selector) -> Result<(), BrowserError> {
        let hang = {
            let mut state = self.state.lock().unwrap();
            if self.element_box(&state, selector).is_none() {
                return Err(BrowserError::NotFound(selector.clone()));
            }
            if *selector == self.ui.login_submit() {
                let accepted = state.credentials.as_ref().is_some_and(|credentials| {
                    credentials.email == state.email_input
                        && credentials.password == state.password_input
                });
                if accepted {
                    state.logged_in = true;
                    state.url = ADMIN_URL.to_string();
                }
            }
            if *selector == self.ui.expand_all() {
                state.expanded = true;
                state.hang_on_expand
            } else {
                false
            }
        };
        if hang {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        Ok(())
    }

    async fn fill(&self, selector: &Selector, value: &str) -> Result<(), BrowserError> {
        let mut state = self.state.lock().unwrap();
        if self.element_box(&state, selector).is_none() {
            return Err(BrowserError::NotFound(selector.clone()));
        }
        if *selector == self.ui.login_email() {
            state.email_input = value.to_string();
        } else if *selector == self.ui.login_password() {
            state.password_input = value.to_string();
        }
        Ok(())
    }

    async fn is_visible(&self, selector: &Selector) -> Result<bool, BrowserError> {
        let state = self.state.lock().unwrap();
        Ok(self.element_box(&state, selector).is_some())
    }

    async fn bounding_box(
        &self,
        selector: &Selector,
    ) -> Result<Option<BoundingBox>, BrowserError> {
        let state = self.state.lock().unwrap();
        Ok(self.element_box(&state, selector))
    }

    async fn hover(&self, selector: &Selector) -> Result<(), BrowserError> {
        let mut state = self.state.lock().unwrap();
        let target = self
            .element_box(&state, selector)
            .ok_or_else(|| BrowserError::NotFound(selector.clone()))?;
        state.pointer = Some(target.center());
        Ok(())
    }

    async fn pointer_down(&self) -> Result<(), BrowserError> {
        let mut state = self.state.lock().unwrap();
        let pointer = state.pointer.ok_or_else(|| BrowserError::Protocol("no pointer".into()))?;
        state.pressed = (0 .. state.rows.len()).find(|index| handle_box(*index).contains(pointer));
        Ok(())
    }

    async fn pointer_move(&self, to: Point, steps: u32) -> Result<(), BrowserError> {
        let mut state = self.state.lock().unwrap();
        if state.viewport_height.is_some_and(|height| to.y > height) {
            return Err(BrowserError::OutOfBounds(format!("({}, {})", to.x, to.y)));
        }
        state.pointer = Some(to);
        state.move_steps.push(steps);
        Ok(())
    }

    async fn pointer_up(&self) -> Result<(), BrowserError> {
        let mut state = self.state.lock().unwrap();
        let (Some(source), Some(point)) = (state.pressed.take(), state.pointer) else {
            return Ok(());
        };
        let target = drop_target(state.rows.len(), source, point);
        if target != source {
            let moved = state.rows.remove(source);
            state.rows.insert(target, moved);
        }
        state.moves.push((source, target));
        Ok(())
    }

    async fn input_value(&self, selector: &Selector) -> Result<Option<String>, BrowserError> {
        let state = self.state.lock().unwrap();
        Ok(self.text_value(&state, selector))
    }

    async fn all_inner_texts(&self, selector: &Selector) -> Result<Vec<String>, BrowserError> {
        let state = self.state.lock().unwrap();
        Ok(self.labels(&state, selector))
    }

    async fn emulate_network(&self, profile: &NetworkProfile) -> Result<(), BrowserError> {
        let mut state = self.state.lock().unwrap();
        state.network_applied_at = Some(ThrottlePoint {
            on_document: Self::on_document(&state),
            expanded: state.expanded,
            moves: state.moves.len(),
        });
        state.network = Some(profile.clone());
        Ok(())
    }

    async fn close(&self) -> Result<(), BrowserError> {
        self.state.lock().unwrap().closed = true;
        Ok(())
    }
}

// ============================================================================
// SECTION: Block Builders
// ============================================================================

pub fn seed(id: u64, name: &str) -> blockdrag_core::SeedRef {
    blockdrag_core::SeedRef::Populated(Seed {
        id: DocId::Number(id),
        name: Some(name.to_string()),
    })
}

pub fn apple(name: &str, kind: &str, conditional: Option<&str>, seeds: Vec<blockdrag_core::SeedRef>) -> Block {
    Block::Apple(blockdrag_core::AppleBlock {
        id: Some(format!("{name}-row")),
        block_name: Some(name.to_string()),
        apple_kind: Some(kind.to_string()),
        show_conditional_apple: Some(conditional.is_some()),
        conditional_fields: conditional.map(|value| blockdrag_core::AppleConditionalFields {
            conditional_field_apple: Some(value.to_string()),
        }),
        seed_apple: seeds,
    })
}

pub fn pear(name: &str, pear_type: &str, seeds: Vec<blockdrag_core::SeedRef>) -> Block {
    Block::Pear(blockdrag_core::PearBlock {
        id: Some(format!("{name}-row")),
        block_name: Some(name.to_string()),
        pear_type: Some(pear_type.to_string()),
        seed_pear: seeds,
        ..blockdrag_core::PearBlock::default()
    })
}

/// Apple A, Apple B, Pear C, and a trailing filler pear.
pub fn reproduction_blocks() -> Vec<Block> {
    vec![
        apple(
            "Apple A",
            "Apple With Conditional fields",
            Some("Conditiional field apple A"),
            vec![seed(1, "Seeds for Apple A - 1"), seed(2, "Seeds for Apple A - 2")],
        ),
        apple(
            "Apple B",
            "Apple without conditional fields",
            None,
            vec![seed(3, "Seeds for Apple B - 1"), seed(4, "Seeds for Apple B - 2")],
        ),
        pear("Pear C", "Pear C", vec![seed(5, "Seeds for Pear C - 1"), seed(6, "Seeds for Pear C - 2")]),
        pear("Dummy", "Dummy pear", Vec::new()),
    ]
}
