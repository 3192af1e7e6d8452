use anyhow::bail;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};
use std::str::FromStr;

/// The fixed set of expense buckets. Declaration order is the column order everywhere totals or
/// percentages are reported.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Transport,
    Food,
    Medication,
    House,
    Car,
    School,
    Diverse,
}

serde_plain::derive_display_from_serialize!(Category);

impl Category {
    pub const COUNT: usize = 7;

    pub const ALL: [Category; Category::COUNT] = [
        Category::Transport,
        Category::Food,
        Category::Medication,
        Category::House,
        Category::Car,
        Category::School,
        Category::Diverse,
    ];

    /// Position in `Category::ALL`.
    pub fn index(self) -> usize {
        self as usize
    }

    /// The key used in snapshots and on the command line, e.g. `medication`.
    pub fn key(self) -> &'static str {
        match self {
            Category::Transport => "transport",
            Category::Food => "food",
            Category::Medication => "medication",
            Category::House => "house",
            Category::Car => "car",
            Category::School => "school",
            Category::Diverse => "diverse",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::Transport => "Transport",
            Category::Food => "Food",
            Category::Medication => "Medication",
            Category::House => "House",
            Category::Car => "Car",
            Category::School => "School",
            Category::Diverse => "Diverse",
        }
    }

    /// Color hint for charts.
    pub fn color(self) -> &'static str {
        match self {
            Category::Transport => "hsl(210, 70%, 50%)",
            Category::Food => "hsl(25, 95%, 55%)",
            Category::Medication => "hsl(350, 70%, 55%)",
            Category::House => "hsl(45, 85%, 50%)",
            Category::Car => "hsl(280, 60%, 55%)",
            Category::School => "hsl(170, 65%, 45%)",
            Category::Diverse => "hsl(200, 20%, 50%)",
        }
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        match Category::ALL.iter().find(|c| c.key() == lower) {
            Some(c) => Ok(*c),
            None => bail!("Invalid category '{s}'"),
        }
    }
}

/// One value per `Category`, always complete.
///
/// Serializes as a map from category key to value, in category order. Deserializing accepts a
/// map with any subset of the keys (missing keys get `T::default()`) and rejects unknown keys.
#[derive(Debug, Clone, Eq, PartialEq, Hash)]
pub struct PerCategory<T>([T; Category::COUNT]);

impl<T> PerCategory<T> {
    pub fn from_fn(mut f: impl FnMut(Category) -> T) -> Self {
        Self(std::array::from_fn(|ix| f(Category::ALL[ix])))
    }

    /// Iterates `(category, value)` pairs in category order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &T)> + '_ {
        Category::ALL.iter().copied().zip(self.0.iter())
    }

    pub fn values(&self) -> impl Iterator<Item = &T> + '_ {
        self.0.iter()
    }

    pub fn map<U>(&self, mut f: impl FnMut(Category, &T) -> U) -> PerCategory<U> {
        PerCategory::from_fn(|c| f(c, &self[c]))
    }
}

impl<T: Default> Default for PerCategory<T> {
    fn default() -> Self {
        Self::from_fn(|_| T::default())
    }
}

impl<T> Index<Category> for PerCategory<T> {
    type Output = T;

    fn index(&self, category: Category) -> &Self::Output {
        &self.0[category.index()]
    }
}

impl<T> IndexMut<Category> for PerCategory<T> {
    fn index_mut(&mut self, category: Category) -> &mut Self::Output {
        &mut self.0[category.index()]
    }
}

impl<T: Serialize> Serialize for PerCategory<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(Category::COUNT))?;
        for (category, value) in self.iter() {
            map.serialize_entry(category.key(), value)?;
        }
        map.end()
    }
}

impl<'de, T> Deserialize<'de> for PerCategory<T>
where
    T: Deserialize<'de> + Default,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(PerCategoryVisitor(PhantomData))
    }
}

struct PerCategoryVisitor<T>(PhantomData<T>);

impl<'de, T> Visitor<'de> for PerCategoryVisitor<T>
where
    T: Deserialize<'de> + Default,
{
    type Value = PerCategory<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map keyed by expense category")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut seen = [false; Category::COUNT];
        let mut out = PerCategory::<T>::default();
        while let Some(key) = access.next_key::<String>()? {
            let category = Category::from_str(&key)
                .map_err(|_| <A::Error as serde::de::Error>::unknown_field(&key, &CATEGORY_KEYS))?;
            if seen[category.index()] {
                return Err(serde::de::Error::duplicate_field(category.key()));
            }
            seen[category.index()] = true;
            out[category] = access.next_value()?;
        }
        Ok(out)
    }
}

static CATEGORY_KEYS: [&str; Category::COUNT] = [
    "transport",
    "food",
    "medication",
    "house",
    "car",
    "school",
    "diverse",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_matches_index() {
        for (ix, category) in Category::ALL.iter().enumerate() {
            assert_eq!(ix, category.index());
            assert_eq!(CATEGORY_KEYS[ix], category.key());
        }
    }

    #[test]
    fn test_display_is_key() {
        assert_eq!(Category::Medication.to_string(), "medication");
    }

    #[test]
    fn test_from_str() {
        assert_eq!(Category::from_str("Food").unwrap(), Category::Food);
        assert_eq!(Category::from_str(" school ").unwrap(), Category::School);
        assert!(Category::from_str("groceries").is_err());
    }

    #[test]
    fn test_per_category_serializes_every_key_in_order() {
        let values = PerCategory::from_fn(|c| c.index() as u32);
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(
            json,
            r#"{"transport":0,"food":1,"medication":2,"house":3,"car":4,"school":5,"diverse":6}"#
        );
    }

    #[test]
    fn test_per_category_missing_keys_default() {
        let values: PerCategory<String> = serde_json::from_str(r#"{"car":"65.00"}"#).unwrap();
        assert_eq!(values[Category::Car], "65.00");
        assert_eq!(values[Category::Food], "");
    }

    #[test]
    fn test_per_category_rejects_unknown_key() {
        let result = serde_json::from_str::<PerCategory<String>>(r#"{"groceries":"1"}"#);
        assert!(result.is_err());
    }
}
