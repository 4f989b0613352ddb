use std::collections::HashSet;

use super::{UniformLayout, UniformType};

#[derive(Debug, Copy, Clone)]
enum Value {
    Bool(bool),
    Int(i32),
    Float(f32),
}

impl Value {
    /// Little-endian bytes for a member of type `ty`, or `None` if the value
    /// cannot be stored there.
    fn encode(self, ty: UniformType) -> Option<[u8; 4]> {
        match (self, ty) {
            (Value::Bool(b), UniformType::U32) => Some((b as u32).to_le_bytes()),
            (Value::Bool(b), UniformType::I32) => Some((b as i32).to_le_bytes()),
            (Value::Int(i), UniformType::I32) => Some(i.to_le_bytes()),
            (Value::Int(i), UniformType::U32) => Some((i as u32).to_le_bytes()),
            (Value::Float(f), UniformType::F32) => Some(f.to_le_bytes()),
            _ => None,
        }
    }
}

/// CPU copy of a program's uniform block.
///
/// Setters write into the copy and mark it dirty; the program uploads it when
/// it is next activated. Unknown names and type mismatches are ignored (logged
/// once per name at debug level), like a `-1` uniform location in GL.
#[derive(Debug, Clone)]
pub struct UniformBlock {
    layout: UniformLayout,
    data: Vec<u8>,
    dirty: bool,
    reported: HashSet<String>,
}

impl UniformBlock {
    /// Zero-initialized block for `layout`.
    pub fn new(layout: UniformLayout) -> Self {
        let data = vec![0; layout.size as usize];
        Self {
            layout,
            data,
            dirty: true,
            reported: HashSet::new(),
        }
    }

    pub fn layout(&self) -> &UniformLayout {
        &self.layout
    }

    /// Stored as 1/0 in a `u32` or `i32` member. WGSL has no host-shareable
    /// `bool`.
    pub fn set_bool(&mut self, name: &str, value: bool) -> bool {
        self.write(name, Value::Bool(value))
    }

    pub fn set_int(&mut self, name: &str, value: i32) -> bool {
        self.write(name, Value::Int(value))
    }

    pub fn set_float(&mut self, name: &str, value: f32) -> bool {
        self.write(name, Value::Float(value))
    }

    pub fn get_f32(&self, name: &str) -> Option<f32> {
        self.read(name, UniformType::F32).map(f32::from_le_bytes)
    }

    pub fn get_i32(&self, name: &str) -> Option<i32> {
        self.read(name, UniformType::I32).map(i32::from_le_bytes)
    }

    pub fn get_u32(&self, name: &str) -> Option<u32> {
        self.read(name, UniformType::U32).map(u32::from_le_bytes)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Returns whether an upload is pending and clears the flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::replace(&mut self.dirty, false)
    }

    fn write(&mut self, name: &str, value: Value) -> bool {
        let Some((offset, ty)) = self.layout.member(name).map(|m| (m.offset as usize, m.ty)) else {
            self.report(name, "no such uniform in the program");
            return false;
        };

        let Some(bytes) = value.encode(ty) else {
            self.report(name, "value does not match the uniform's type");
            return false;
        };

        self.data[offset..offset + 4].copy_from_slice(&bytes);
        self.dirty = true;
        true
    }

    fn read(&self, name: &str, ty: UniformType) -> Option<[u8; 4]> {
        let m = self.layout.member(name).filter(|m| m.ty == ty)?;
        let at = m.offset as usize;
        self.data.get(at..at + 4)?.try_into().ok()
    }

    fn report(&mut self, name: &str, why: &str) {
        if self.reported.insert(name.to_string()) {
            log::debug!("uniform `{name}` ignored: {why}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::shader::UniformMember;

    fn layout() -> UniformLayout {
        let m = |name: &str, offset, ty| UniformMember {
            name: name.to_string(),
            offset,
            ty,
        };
        UniformLayout {
            size: 16,
            members: vec![
                m("blend", 0, UniformType::F32),
                m("tiles", 4, UniformType::I32),
                m("show_texture", 8, UniformType::U32),
            ],
        }
    }

    // ── setters ───────────────────────────────────────────────────────────

    #[test]
    fn setters_write_at_member_offsets() {
        let mut block = UniformBlock::new(layout());
        assert!(block.set_float("blend", 0.5));
        assert!(block.set_int("tiles", -3));
        assert!(block.set_bool("show_texture", true));

        assert_eq!(block.get_f32("blend"), Some(0.5));
        assert_eq!(block.get_i32("tiles"), Some(-3));
        assert_eq!(block.get_u32("show_texture"), Some(1));
        assert_eq!(&block.bytes()[0..4], &0.5f32.to_le_bytes());
    }

    #[test]
    fn bool_into_int_member() {
        let mut block = UniformBlock::new(layout());
        assert!(block.set_bool("tiles", true));
        assert_eq!(block.get_i32("tiles"), Some(1));
    }

    #[test]
    fn unknown_name_is_a_no_op() {
        let mut block = UniformBlock::new(layout());
        block.take_dirty();
        let before = block.bytes().to_vec();

        assert!(!block.set_float("does_not_exist", 1.0));
        assert!(!block.set_int("does_not_exist", 1));
        assert!(!block.set_bool("does_not_exist", true));

        assert_eq!(block.bytes(), before.as_slice());
        assert!(!block.is_dirty());
    }

    #[test]
    fn type_mismatch_is_a_no_op() {
        let mut block = UniformBlock::new(layout());
        assert!(!block.set_float("tiles", 2.0));
        assert!(!block.set_int("blend", 2));
        assert_eq!(block.get_i32("tiles"), Some(0));
    }

    #[test]
    fn empty_layout_accepts_nothing() {
        let mut block = UniformBlock::new(UniformLayout::default());
        assert!(block.bytes().is_empty());
        assert!(!block.set_float("anything", 1.0));
    }

    // ── dirty tracking ────────────────────────────────────────────────────

    #[test]
    fn new_block_needs_upload_once() {
        let mut block = UniformBlock::new(layout());
        assert!(block.take_dirty());
        assert!(!block.take_dirty());

        block.set_float("blend", 1.0);
        assert!(block.take_dirty());
    }
}
