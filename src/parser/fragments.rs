//! Content-stream interpreter producing positioned text fragments.
//!
//! Tracks just enough of the graphics and text state to place every shown
//! string in page space: the current transformation matrix (`cm`, `q`/`Q`),
//! the text and line matrices (`BT`, `Tm`, `Td`, `TD`, `T*`, `'`, `"`) and
//! the leading (`TL`). Glyph widths are not tracked, so consecutive strings
//! shown without a positioning operator share an origin.

use super::backend::{ContentOp, Operand};
use crate::model::TextFragment;

/// `TJ` adjustments beyond this (thousandths of text space) read as a word gap.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// 2D affine transform `[a, b, c, d, e, f]`.
type Matrix = [f32; 6];

const IDENTITY: Matrix = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

/// `m × n` in PDF's row-vector convention.
fn multiply(m: &Matrix, n: &Matrix) -> Matrix {
    [
        m[0] * n[0] + m[1] * n[2],
        m[0] * n[1] + m[1] * n[3],
        m[2] * n[0] + m[3] * n[2],
        m[2] * n[1] + m[3] * n[3],
        m[4] * n[0] + m[5] * n[2] + n[4],
        m[4] * n[1] + m[5] * n[3] + n[5],
    ]
}

fn matrix_operand(operands: &[Operand]) -> Option<Matrix> {
    if operands.len() < 6 {
        return None;
    }
    let mut m = IDENTITY;
    for (slot, value) in m.iter_mut().zip(operands) {
        *slot = value.as_number()?;
    }
    Some(m)
}

fn number(operands: &[Operand], index: usize) -> Option<f32> {
    operands.get(index).and_then(Operand::as_number)
}

struct TextState {
    ctm: Matrix,
    ctm_stack: Vec<Matrix>,
    text_matrix: Matrix,
    line_matrix: Matrix,
    leading: f32,
    font: Vec<u8>,
    in_text: bool,
}

impl TextState {
    fn new() -> Self {
        Self {
            ctm: IDENTITY,
            ctm_stack: Vec::new(),
            text_matrix: IDENTITY,
            line_matrix: IDENTITY,
            leading: 0.0,
            font: Vec::new(),
            in_text: false,
        }
    }

    fn move_line(&mut self, tx: f32, ty: f32) {
        self.line_matrix = multiply(&[1.0, 0.0, 0.0, 1.0, tx, ty], &self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    fn next_line(&mut self) {
        self.move_line(0.0, -self.leading);
    }

    /// The text-rendering transform (without font size and rise).
    fn rendering_matrix(&self) -> Matrix {
        multiply(&self.text_matrix, &self.ctm)
    }
}

/// Turn content-stream operations into text fragments.
///
/// `decode` maps (font resource name, string bytes) to text. Strings that
/// decode to whitespace only are dropped.
pub fn interpret<F>(ops: &[ContentOp], decode: F) -> Vec<TextFragment>
where
    F: Fn(&[u8], &[u8]) -> String,
{
    let mut state = TextState::new();
    let mut fragments = Vec::new();

    let mut show = |state: &TextState, text: String| {
        if state.in_text && !text.trim().is_empty() {
            fragments.push(TextFragment::from_transform(text, state.rendering_matrix()));
        }
    };

    for op in ops {
        let operands = op.operands.as_slice();
        match op.operator.as_str() {
            "q" => state.ctm_stack.push(state.ctm),
            "Q" => {
                if let Some(ctm) = state.ctm_stack.pop() {
                    state.ctm = ctm;
                }
            }
            "cm" => {
                if let Some(m) = matrix_operand(operands) {
                    state.ctm = multiply(&m, &state.ctm);
                }
            }
            "BT" => {
                state.in_text = true;
                state.text_matrix = IDENTITY;
                state.line_matrix = IDENTITY;
            }
            "ET" => state.in_text = false,
            "Tf" => {
                if let Some(Operand::Name(name)) = operands.first() {
                    state.font = name.clone();
                }
            }
            "TL" => {
                if let Some(leading) = number(operands, 0) {
                    state.leading = leading;
                }
            }
            "Td" | "TD" => {
                if let (Some(tx), Some(ty)) = (number(operands, 0), number(operands, 1)) {
                    if op.operator == "TD" {
                        state.leading = -ty;
                    }
                    state.move_line(tx, ty);
                }
            }
            "Tm" => {
                if let Some(m) = matrix_operand(operands) {
                    state.text_matrix = m;
                    state.line_matrix = m;
                }
            }
            "T*" => state.next_line(),
            "Tj" => {
                if let Some(Operand::Bytes(bytes)) = operands.first() {
                    let text = decode(&state.font, bytes);
                    show(&state, text);
                }
            }
            "TJ" => {
                if let Some(Operand::Array(items)) = operands.first() {
                    let text = join_tj(items, |bytes| decode(&state.font, bytes));
                    show(&state, text);
                }
            }
            "'" | "\"" => {
                state.next_line();
                let index = if op.operator == "\"" { 2 } else { 0 };
                if let Some(Operand::Bytes(bytes)) = operands.get(index) {
                    let text = decode(&state.font, bytes);
                    show(&state, text);
                }
            }
            _ => {}
        }
    }

    log::debug!("FragmentInterpreter: {} fragments", fragments.len());
    fragments
}

/// Concatenate a `TJ` array, turning large negative adjustments into spaces.
fn join_tj(items: &[Operand], decode: impl Fn(&[u8]) -> String) -> String {
    let mut combined = String::new();
    for item in items {
        match item {
            Operand::Bytes(bytes) => combined.push_str(&decode(bytes)),
            value => {
                let Some(adjustment) = value.as_number() else {
                    continue;
                };
                if -adjustment > TJ_SPACE_THRESHOLD
                    && !combined.is_empty()
                    && !combined.ends_with(char::is_whitespace)
                {
                    combined.push(' ');
                }
            }
        }
    }
    combined
}
