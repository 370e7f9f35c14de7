use std::{collections::BTreeMap, rc::Rc};

/// Keeps track of used scoreboard constants that are used in the datapack
///
/// Ordered by value, so the initialization in `__load` is deterministic.
#[derive(Debug, Default)]
pub(crate) struct ScoreboardConstants {
    constants: BTreeMap<i32, Rc<str>>,
}

impl ScoreboardConstants {
    pub fn name(value: i32) -> Rc<str> {
        format!("#const_{value}").into()
    }

    pub fn get_name(&mut self, value: i32) -> Rc<str> {
        self.constants
            .entry(value)
            .or_insert_with(|| ScoreboardConstants::name(value))
            .clone()
    }

    pub fn constants(&self) -> impl Iterator<Item = (i32, &Rc<str>)> + '_ {
        self.constants.iter().map(|(value, name)| (*value, name))
    }
}
