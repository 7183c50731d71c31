use crate::{Collection, Element, Struct};
use datacore_types::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::any::Any;

/// A named metadata flag with an arbitrary value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flag {
    pub flag: String,
    pub value: Value,
}

impl Flag {
    pub const TYPE_TAG: &'static str = "flag";

    pub fn new(flag: impl Into<String>, value: Value) -> Self {
        Self {
            flag: flag.into(),
            value,
        }
    }
}

impl Struct for Flag {
    fn type_tag(&self) -> &str {
        Self::TYPE_TAG
    }

    fn json_serialize(&self) -> Value {
        json!({ "flag": self.flag, "value": self.value })
    }

    fn clone_struct(&self) -> Box<dyn Struct> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Element for Flag {
    fn element_type(&self) -> &str {
        Self::TYPE_TAG
    }

    fn as_struct(&self) -> Option<&dyn Struct> {
        Some(self)
    }
}

/// Flags keyed by flag name.
pub type FlagCollection = Collection<Flag>;

impl Collection<Flag> {
    pub fn from_flags(flags: impl IntoIterator<Item = Flag>) -> Result<Self> {
        Self::from_keyed(
            Flag::TYPE_TAG,
            flags.into_iter().map(|flag| (flag.flag.clone(), flag)),
        )
    }

    /// Value of the named flag, if set.
    pub fn value_of(&self, flag: &str) -> Option<&Value> {
        self.get(flag).map(|f| &f.value)
    }
}
