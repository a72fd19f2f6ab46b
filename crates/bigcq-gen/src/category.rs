//! Question categories shared by the CQ and SPARQL generators.
//!
//! Both generators decide whether a category applies to a shape through
//! [`Category::applies_to`], so the CQ side and the query side cannot drift.

use bigcq_shape::AxiomShape;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Ask,
    SelectCar,
    SelectCad,
    SelectVerb,
    SelectCountCar,
    SelectCountCad,
    SelectCountVerb,
}

/// What a category turns into the query variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// Yes/no over the whole axiom.
    Whole,
    Domain,
    Range,
    Verb,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Category::Ask,
        Category::SelectCar,
        Category::SelectCad,
        Category::SelectVerb,
        Category::SelectCountCar,
        Category::SelectCountCad,
        Category::SelectCountVerb,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Ask => "ASK",
            Category::SelectCar => "SELECT_CAR",
            Category::SelectCad => "SELECT_CAD",
            Category::SelectVerb => "SELECT_VERB",
            Category::SelectCountCar => "SELECT_COUNT_CAR",
            Category::SelectCountCad => "SELECT_COUNT_CAD",
            Category::SelectCountVerb => "SELECT_COUNT_VERB",
        }
    }

    fn index(self) -> usize {
        self as usize
    }

    pub fn focus(self) -> Focus {
        match self {
            Category::Ask => Focus::Whole,
            Category::SelectCar | Category::SelectCountCar => Focus::Range,
            Category::SelectCad | Category::SelectCountCad => Focus::Domain,
            Category::SelectVerb | Category::SelectCountVerb => Focus::Verb,
        }
    }

    pub fn is_count(self) -> bool {
        matches!(
            self,
            Category::SelectCountCar | Category::SelectCountCad | Category::SelectCountVerb
        )
    }

    /// Whether this category yields questions and a query for `shape`.
    pub fn applies_to(self, shape: &AxiomShape) -> bool {
        match self.focus() {
            Focus::Whole => true,
            Focus::Domain => shape.domain_is_focusable(),
            Focus::Range => shape.range_is_focusable(),
            Focus::Verb => shape.predicate_id.is_some(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| format!("unknown question category `{s}`"))
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// One value per category; every category always has a slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryMap<T> {
    slots: [T; 7],
}

impl<T: Default> Default for CategoryMap<T> {
    fn default() -> Self {
        Self {
            slots: Default::default(),
        }
    }
}

impl<T> CategoryMap<T> {
    pub fn from_fn(mut f: impl FnMut(Category) -> T) -> Self {
        Self {
            slots: Category::ALL.map(&mut f),
        }
    }

    pub fn get(&self, category: Category) -> &T {
        &self.slots[category.index()]
    }

    pub fn get_mut(&mut self, category: Category) -> &mut T {
        &mut self.slots[category.index()]
    }

    pub fn set(&mut self, category: Category, value: T) {
        self.slots[category.index()] = value;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &T)> {
        Category::ALL.into_iter().zip(self.slots.iter())
    }

    pub fn map<U>(self, mut f: impl FnMut(Category, T) -> U) -> CategoryMap<U> {
        let mut values = self.slots.into_iter();
        CategoryMap::from_fn(|c| match values.next() {
            Some(v) => f(c, v),
            None => unreachable!("one slot per category"),
        })
    }
}

impl<T: Serialize> Serialize for CategoryMap<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.slots.len()))?;
        for (category, value) in self.iter() {
            map.serialize_entry(category.as_str(), value)?;
        }
        map.end()
    }
}
