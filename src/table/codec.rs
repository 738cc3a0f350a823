//! Binary table artifacts
//!
//! Layout (all integers little-endian):
//!
//! ```text
//! magic "LRTB" | version u16 | name
//! terminals:    u32 count, u16 kind each
//! nonterminals: u32 count, name each
//! start:        u16
//! fields:       u32 count, name each
//! productions:  u32 count, (lhs u16, len u16, kind u16, u16 count, (u16 position, u16 field)*) each
//! states:       u32
//! actions:      u32 count, u32 each
//! gotos:        u32 count, u32 each
//! conflicts:    u32 count, (state u32, lookahead u16, kind u8, chosen u32, u32 count, u32*) each
//! ```
//!
//! Names are a u32 byte length followed by UTF-8. Actions pack a tag in the
//! low two bits: 0 error, 1 accept, 2 shift, 3 reduce.

use smol_str::SmolStr;

use super::{Action, Conflict, ConflictKind, FieldId, NO_STATE, ParseTable, ProductionInfo, TABLE_FORMAT_VERSION};
use crate::error::{Error, Result};
use crate::parser::SyntaxKind;

const MAGIC: &[u8; 4] = b"LRTB";
const NO_KIND: u16 = u16::MAX;

impl ParseTable {
    /// Serialize into the versioned binary artifact format
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut w = Writer::default();
        w.bytes.extend_from_slice(MAGIC);
        w.u16(TABLE_FORMAT_VERSION);
        w.str(&self.name);

        w.len(self.terminals.len());
        for kind in &self.terminals {
            w.u16(*kind as u16);
        }
        w.len(self.nonterminals.len());
        for name in &self.nonterminals {
            w.str(name);
        }
        w.u16(self.start);
        w.len(self.field_names.len());
        for name in &self.field_names {
            w.str(name);
        }

        w.len(self.productions.len());
        for production in &self.productions {
            w.u16(production.lhs);
            w.u16(production.len);
            w.u16(production.kind.map_or(NO_KIND, |kind| kind as u16));
            w.u16(production.fields.len() as u16);
            for (position, field) in production.fields.iter() {
                w.u16(*position);
                w.u16(field.0);
            }
        }

        w.u32(self.state_count);
        w.len(self.actions.len());
        for action in &self.actions {
            w.u32(encode_action(*action));
        }
        w.len(self.gotos.len());
        for goto in &self.gotos {
            w.u32(*goto);
        }

        w.len(self.conflicts.len());
        for conflict in &self.conflicts {
            w.u32(conflict.state);
            w.u16(conflict.lookahead as u16);
            w.bytes.push(match conflict.kind {
                ConflictKind::ShiftReduce => 0,
                ConflictKind::ReduceReduce => 1,
            });
            w.u32(encode_action(conflict.chosen));
            w.len(conflict.candidates.len());
            for candidate in &conflict.candidates {
                w.u32(encode_action(*candidate));
            }
        }
        w.bytes
    }

    /// Load a table artifact, validating it against this build
    pub fn from_bytes(bytes: &[u8]) -> Result<ParseTable> {
        let mut r = Reader { bytes, pos: 0 };
        if r.take(4)? != MAGIC {
            return Err(Error::malformed("bad magic"));
        }
        let found = r.u16()?;
        if found != TABLE_FORMAT_VERSION {
            return Err(Error::TableVersionMismatch {
                expected: TABLE_FORMAT_VERSION,
                found,
            });
        }
        let name = r.str()?;

        let terminal_count = r.len()?;
        let mut terminals = Vec::with_capacity(terminal_count);
        for _ in 0..terminal_count {
            terminals.push(r.kind()?);
        }
        if terminals.first() != Some(&SyntaxKind::EOF) {
            return Err(Error::malformed("terminal 0 must be end of input"));
        }
        let nonterminal_count = r.len()?;
        let mut nonterminals = Vec::with_capacity(nonterminal_count);
        for _ in 0..nonterminal_count {
            nonterminals.push(r.str()?);
        }
        let start = r.u16()?;
        if start as usize >= nonterminal_count {
            return Err(Error::malformed("start symbol out of range"));
        }
        let field_count = r.len()?;
        let mut field_names = Vec::with_capacity(field_count);
        for _ in 0..field_count {
            field_names.push(r.str()?);
        }

        let production_count = r.len()?;
        let mut productions = Vec::with_capacity(production_count);
        for _ in 0..production_count {
            let lhs = r.u16()?;
            let len = r.u16()?;
            let kind = match r.u16()? {
                NO_KIND => None,
                raw => Some(SyntaxKind::from_raw(raw).ok_or_else(|| Error::malformed("unknown node kind"))?),
            };
            let mut fields = Vec::new();
            for _ in 0..r.u16()? {
                let position = r.u16()?;
                let field = r.u16()?;
                if position >= len || field as usize >= field_count {
                    return Err(Error::malformed("field out of range"));
                }
                fields.push((position, FieldId(field)));
            }
            if lhs as usize >= nonterminal_count {
                return Err(Error::malformed("production lhs out of range"));
            }
            productions.push(ProductionInfo {
                lhs,
                len,
                kind,
                fields: fields.into_boxed_slice(),
            });
        }

        let state_count = r.u32()?;
        if state_count == 0 {
            return Err(Error::malformed("table has no states"));
        }
        let check_action = |action: Action| -> Result<Action> {
            match action {
                Action::Shift(target) if target >= state_count => Err(Error::malformed("shift target out of range")),
                Action::Reduce(id) if id as usize >= production_count => {
                    Err(Error::malformed("reduced production out of range"))
                }
                other => Ok(other),
            }
        };

        let action_count = r.len()?;
        if action_count != state_count as usize * terminal_count {
            return Err(Error::malformed("action table size mismatch"));
        }
        let mut actions = Vec::with_capacity(action_count);
        for index in 0..action_count {
            let action = check_action(decode_action(r.u32()?))?;
            // Terminal 0 is end of input, the only place a parse may finish
            if action == Action::Accept && index % terminal_count != 0 {
                return Err(Error::malformed("accept outside the end-of-input column"));
            }
            actions.push(action);
        }
        let goto_count = r.len()?;
        if goto_count != state_count as usize * nonterminal_count {
            return Err(Error::malformed("goto table size mismatch"));
        }
        let mut gotos = Vec::with_capacity(goto_count);
        for _ in 0..goto_count {
            let target = r.u32()?;
            if target != NO_STATE && target >= state_count {
                return Err(Error::malformed("goto target out of range"));
            }
            gotos.push(target);
        }

        let conflict_count = r.len()?;
        let mut conflicts = Vec::with_capacity(conflict_count);
        for _ in 0..conflict_count {
            let state = r.u32()?;
            let lookahead = r.kind()?;
            let kind = match r.take(1)?[0] {
                0 => ConflictKind::ShiftReduce,
                1 => ConflictKind::ReduceReduce,
                _ => return Err(Error::malformed("unknown conflict kind")),
            };
            let chosen = check_action(decode_action(r.u32()?))?;
            let mut candidates = Vec::new();
            for _ in 0..r.len()? {
                candidates.push(check_action(decode_action(r.u32()?))?);
            }
            conflicts.push(Conflict {
                state,
                lookahead,
                kind,
                candidates,
                chosen,
            });
        }

        if r.pos != bytes.len() {
            return Err(Error::malformed("trailing bytes after table"));
        }

        Ok(ParseTable::from_parts(
            name,
            terminals,
            nonterminals,
            start,
            field_names,
            productions,
            state_count,
            actions,
            gotos,
            conflicts,
        ))
    }
}

fn encode_action(action: Action) -> u32 {
    match action {
        Action::Error => 0,
        Action::Accept => 1,
        Action::Shift(state) => (state << 2) | 2,
        Action::Reduce(production) => (production << 2) | 3,
    }
}

fn decode_action(raw: u32) -> Action {
    match raw & 3 {
        2 => Action::Shift(raw >> 2),
        3 => Action::Reduce(raw >> 2),
        1 => Action::Accept,
        _ => Action::Error,
    }
}

#[derive(Default)]
struct Writer {
    bytes: Vec<u8>,
}

impl Writer {
    fn u16(&mut self, value: u16) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    fn u32(&mut self, value: u32) {
        self.bytes.extend_from_slice(&value.to_le_bytes());
    }

    fn len(&mut self, len: usize) {
        self.u32(len as u32);
    }

    fn str(&mut self, value: &str) {
        self.len(value.len());
        self.bytes.extend_from_slice(value.as_bytes());
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| Error::malformed(format!("truncated at byte {}", self.pos)))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u16(&mut self) -> Result<u16> {
        let b = self.take(2)?;
        Ok(u16::from_le_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32> {
        let b = self.take(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn len(&mut self) -> Result<usize> {
        let len = self.u32()? as usize;
        // Every counted element takes at least one byte
        if len > self.bytes.len() - self.pos {
            return Err(Error::malformed(format!("count {len} exceeds artifact size")));
        }
        Ok(len)
    }

    fn str(&mut self) -> Result<SmolStr> {
        let len = self.len()?;
        let bytes = self.take(len)?;
        std::str::from_utf8(bytes)
            .map(SmolStr::new)
            .map_err(|_| Error::malformed("name is not UTF-8"))
    }

    fn kind(&mut self) -> Result<SyntaxKind> {
        SyntaxKind::from_raw(self.u16()?).ok_or_else(|| Error::malformed("unknown token kind"))
    }
}
