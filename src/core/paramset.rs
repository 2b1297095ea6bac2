//! Bundle up parameters and their values in a generic way.
//!
//! Accelerators are configured by name, e.g. `"maxprims"` or
//! `"splitmethod"`, the same way a scene description would pass them.
//! Every lookup marks the parameter as used, so that misspelled names
//! can be reported afterwards.
//!
//! ```rust
//! use rs_accel::core::paramset::ParamSet;
//!
//!     let mut ps = ParamSet::default();
//!     ps.add_int(String::from("maxprims"), 4);
//!     assert_eq!(ps.find_one_int("maxprims", 1), 4);
//!     assert_eq!(ps.find_one_int("maxdepth", -1), -1);
//! ```

// std
use std::cell::Cell;
// others
use log::warn;
// rs_accel
use crate::core::pbrt::Float;

#[derive(Debug, Clone)]
pub struct ParamSetItem<T> {
    pub name: String,
    pub values: Vec<T>,
    pub n_values: usize,
    pub looked_up: Cell<bool>,
}

impl<T> ParamSetItem<T> {
    fn new(name: String, values: Vec<T>) -> Self {
        let n_values: usize = values.len();
        ParamSetItem {
            name,
            values,
            n_values,
            looked_up: Cell::new(false),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct ParamSet {
    pub ints: Vec<ParamSetItem<i32>>,
    pub floats: Vec<ParamSetItem<Float>>,
    pub strings: Vec<ParamSetItem<String>>,
}

fn lookup_one<T: Clone>(vec: &[ParamSetItem<T>], name: &str, d: T) -> T {
    for v in vec {
        if v.name == name && v.n_values == 1 {
            v.looked_up.set(true);
            return v.values[0].clone();
        }
    }
    d
}

fn erase<T>(vec: &mut Vec<ParamSetItem<T>>, name: &str) -> bool {
    let len: usize = vec.len();
    vec.retain(|v| v.name != name);
    vec.len() != len
}

impl ParamSet {
    pub fn add_float(&mut self, name: String, value: Float) {
        erase(&mut self.floats, &name);
        self.floats.push(ParamSetItem::new(name, vec![value]));
    }
    pub fn add_int(&mut self, name: String, value: i32) {
        erase(&mut self.ints, &name);
        self.ints.push(ParamSetItem::new(name, vec![value]));
    }
    pub fn add_ints(&mut self, name: String, values: Vec<i32>) {
        erase(&mut self.ints, &name);
        self.ints.push(ParamSetItem::new(name, values));
    }
    pub fn add_string(&mut self, name: String, value: String) {
        erase(&mut self.strings, &name);
        self.strings.push(ParamSetItem::new(name, vec![value]));
    }
    pub fn erase_float(&mut self, name: &str) -> bool {
        erase(&mut self.floats, name)
    }
    pub fn find_one_float(&self, name: &str, d: Float) -> Float {
        lookup_one(&self.floats, name, d)
    }
    pub fn find_one_int(&self, name: &str, d: i32) -> i32 {
        lookup_one(&self.ints, name, d)
    }
    pub fn find_one_string(&self, name: &str, d: String) -> String {
        lookup_one(&self.strings, name, d)
    }
    pub fn find_int(&self, name: &str) -> Vec<i32> {
        let mut values: Vec<i32> = Vec::new();
        for v in &self.ints {
            if v.name == name {
                v.looked_up.set(true);
                values.extend_from_slice(&v.values);
            }
        }
        values
    }
    /// Names of all parameters nobody asked for.
    pub fn unused(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        names.extend(unused_names(&self.ints));
        names.extend(unused_names(&self.floats));
        names.extend(unused_names(&self.strings));
        names
    }
    pub fn report_unused(&self) {
        for name in self.unused() {
            warn!("Parameter \"{}\" not used", name);
        }
    }
}

fn unused_names<T>(vec: &[ParamSetItem<T>]) -> Vec<String> {
    vec.iter()
        .filter(|v| !v.looked_up.get())
        .map(|v| v.name.clone())
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn find_one_returns_default_when_missing() {
        let ps = ParamSet::default();
        assert_eq!(ps.find_one_float("intersectcost", 80.0), 80.0);
        assert_eq!(
            ps.find_one_string("splitmethod", String::from("sah")),
            "sah"
        );
    }

    #[test]
    fn later_values_replace_earlier_ones() {
        let mut ps = ParamSet::default();
        ps.add_int(String::from("maxprims"), 4);
        ps.add_int(String::from("maxprims"), 8);
        assert_eq!(ps.find_one_int("maxprims", 1), 8);
        assert_eq!(ps.ints.len(), 1);
    }

    #[test]
    fn arrays_are_not_single_values() {
        let mut ps = ParamSet::default();
        ps.add_ints(String::from("maxdepth"), vec![1, 2]);
        assert_eq!(ps.find_one_int("maxdepth", -1), -1);
        assert_eq!(ps.find_int("maxdepth"), vec![1, 2]);
    }

    #[test]
    fn unused_parameters_are_reported() {
        let mut ps = ParamSet::default();
        ps.add_int(String::from("maxprims"), 4);
        ps.add_float(String::from("intersectcots"), 10.0);
        ps.find_one_int("maxprims", 1);
        assert_eq!(ps.unused(), vec![String::from("intersectcots")]);
        assert!(ps.erase_float("intersectcots"));
        assert!(ps.unused().is_empty());
    }
}
