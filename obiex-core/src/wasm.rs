//! WASM bindings for obiex-core
//!
//! Provides a JavaScript-friendly API over a [`Session`].

use wasm_bindgen::prelude::*;

use crate::{Encoding, Location, Map, Session, Status};

fn js_err(e: crate::Error) -> JsError {
    JsError::new(&e.to_string())
}

fn encoding(raw: bool) -> Encoding {
    if raw {
        Encoding::Raw
    } else {
        Encoding::Base64
    }
}

/// WASM-friendly wrapper around Session
#[wasm_bindgen]
pub struct WasmSession {
    inner: Session,
}

#[wasm_bindgen]
impl WasmSession {
    /// Create a session on the default board
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmSession {
        WasmSession { inner: Session::new() }
    }

    /// Load a session string; `raw` skips the base64 wrapping
    pub fn load(&mut self, data: &str, raw: bool) -> Result<(), JsError> {
        self.inner.load(data, encoding(raw)).map_err(js_err)
    }

    /// Load a board from `[x, y]` arrays: target, then obstacles
    #[wasm_bindgen(js_name = loadMap)]
    pub fn load_map(&mut self, target: Vec<i64>, obstacles: JsValue) -> Result<(), JsError> {
        let obstacles: Vec<Vec<i64>> =
            serde_wasm_bindgen::from_value(obstacles).map_err(|e| JsError::new(&e.to_string()))?;
        let map = Map::from_components(&target, &obstacles).map_err(js_err)?;
        let board = crate::Board::new(map).map_err(js_err)?;
        self.inner = Session::from_board(board);
        Ok(())
    }

    /// Slide obstacle `index`; `direction` is one of "U", "D", "L", "R".
    /// Returns the new [x, y], or an empty array if the obx fell off.
    #[wasm_bindgen(js_name = moveObstacle)]
    pub fn move_obstacle(&mut self, index: usize, direction: &str) -> Result<Vec<i64>, JsError> {
        let dir = direction.parse::<crate::Direction>().map_err(js_err)?;
        let to = self.inner.move_obstacle(index, dir).map_err(js_err)?;
        Ok(to.coord().map(|c| vec![c.x, c.y]).unwrap_or_default())
    }

    pub fn undo(&mut self) -> Result<(), JsError> {
        self.inner.undo().map(|_| ()).map_err(js_err)
    }

    pub fn reset(&mut self) {
        self.inner.reset();
    }

    pub fn serialize(&self, raw: bool) -> String {
        self.inner.serialize(encoding(raw))
    }

    pub fn render(&self) -> String {
        self.inner.state().render()
    }

    #[wasm_bindgen(js_name = isWin)]
    pub fn is_win(&self) -> bool {
        self.inner.state().is_win()
    }

    #[wasm_bindgen(js_name = isLost)]
    pub fn is_lost(&self) -> bool {
        self.inner.state().is_lost()
    }

    /// "playing", "won" or "lost"
    pub fn status(&self) -> String {
        match self.inner.state().status() {
            Status::Playing => "playing".to_string(),
            Status::Won => "won".to_string(),
            Status::Lost => "lost".to_string(),
        }
    }

    /// Target as [x, y]
    pub fn target(&self) -> Vec<i64> {
        let t = self.inner.state().target();
        vec![t.x, t.y]
    }

    /// Obstacles as an array of [x, y], null for lost ones
    pub fn obstacles(&self) -> Result<JsValue, JsError> {
        let obs: Vec<Option<[i64; 2]>> = self
            .inner
            .state()
            .obstacles()
            .iter()
            .map(|ob| match ob {
                Location::OnBoard(c) => Some([c.x, c.y]),
                Location::OffBoard => None,
            })
            .collect();
        serde_wasm_bindgen::to_value(&obs).map_err(|e| JsError::new(&e.to_string()))
    }

    /// Move history in the move-list format
    pub fn moves(&self) -> String {
        self.inner.serialize_moves(Encoding::Raw)
    }

    #[wasm_bindgen(js_name = canUndo)]
    pub fn can_undo(&self) -> bool {
        self.inner.can_undo()
    }
}

impl Default for WasmSession {
    fn default() -> Self {
        Self::new()
    }
}
