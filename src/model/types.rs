//! Field types of both dialects and the tables that map between them.
//!
//! Parsing a type name returns `None` for anything outside the table; the
//! mappers turn that into `MappingError::UnsupportedType`. The conversions
//! between dialects are total matches over closed enums, so a new variant
//! cannot be added without deciding where it maps.

use serde::{Deserialize, Serialize};

/// LookML dimension types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DimensionType {
    String,
    Zipcode,
    Number,
    /// Numeric buckets; requires `tiers`.
    Tier,
    YesNo,
    Date,
    Time,
}

impl DimensionType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "string" => Some(DimensionType::String),
            "zipcode" => Some(DimensionType::Zipcode),
            "number" => Some(DimensionType::Number),
            "tier" => Some(DimensionType::Tier),
            "yesno" => Some(DimensionType::YesNo),
            "date" => Some(DimensionType::Date),
            "time" => Some(DimensionType::Time),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DimensionType::String => "string",
            DimensionType::Zipcode => "zipcode",
            DimensionType::Number => "number",
            DimensionType::Tier => "tier",
            DimensionType::YesNo => "yesno",
            DimensionType::Date => "date",
            DimensionType::Time => "time",
        }
    }

    /// Forward dimension type table.
    pub fn to_cube(self) -> CubeDimensionType {
        match self {
            DimensionType::String | DimensionType::Zipcode => CubeDimensionType::String,
            DimensionType::Number | DimensionType::Tier => CubeDimensionType::Number,
            DimensionType::YesNo => CubeDimensionType::Boolean,
            DimensionType::Date | DimensionType::Time => CubeDimensionType::Time,
        }
    }
}

/// LookML measure types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MeasureType {
    Count,
    Sum,
    SumDistinct,
    Average,
    AverageDistinct,
    CountDistinct,
    Min,
    Max,
    Number,
}

impl MeasureType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "count" => Some(MeasureType::Count),
            "sum" => Some(MeasureType::Sum),
            "sum_distinct" => Some(MeasureType::SumDistinct),
            "average" => Some(MeasureType::Average),
            "average_distinct" => Some(MeasureType::AverageDistinct),
            "count_distinct" => Some(MeasureType::CountDistinct),
            "min" => Some(MeasureType::Min),
            "max" => Some(MeasureType::Max),
            "number" => Some(MeasureType::Number),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MeasureType::Count => "count",
            MeasureType::Sum => "sum",
            MeasureType::SumDistinct => "sum_distinct",
            MeasureType::Average => "average",
            MeasureType::AverageDistinct => "average_distinct",
            MeasureType::CountDistinct => "count_distinct",
            MeasureType::Min => "min",
            MeasureType::Max => "max",
            MeasureType::Number => "number",
        }
    }

    /// Forward measure type table.
    ///
    /// `count_distinct` becomes the approximate variant: Cube's exact
    /// distinct count is far more expensive and LookML users rarely need it.
    /// The reverse table cannot tell the two apart afterwards.
    pub fn to_cube(self) -> CubeMeasureType {
        match self {
            MeasureType::Count => CubeMeasureType::Count,
            MeasureType::Sum | MeasureType::SumDistinct => CubeMeasureType::Sum,
            MeasureType::Average | MeasureType::AverageDistinct => CubeMeasureType::Avg,
            MeasureType::CountDistinct => CubeMeasureType::CountDistinctApprox,
            MeasureType::Min => CubeMeasureType::Min,
            MeasureType::Max => CubeMeasureType::Max,
            MeasureType::Number => CubeMeasureType::Number,
        }
    }
}

/// Cube dimension types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CubeDimensionType {
    String,
    Number,
    Boolean,
    Time,
}

impl CubeDimensionType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "string" => Some(CubeDimensionType::String),
            "number" => Some(CubeDimensionType::Number),
            "boolean" => Some(CubeDimensionType::Boolean),
            "time" => Some(CubeDimensionType::Time),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CubeDimensionType::String => "string",
            CubeDimensionType::Number => "number",
            CubeDimensionType::Boolean => "boolean",
            CubeDimensionType::Time => "time",
        }
    }

    /// Reverse dimension type table.
    pub fn to_lookml(self) -> DimensionType {
        match self {
            CubeDimensionType::String => DimensionType::String,
            CubeDimensionType::Number => DimensionType::Number,
            CubeDimensionType::Boolean => DimensionType::YesNo,
            CubeDimensionType::Time => DimensionType::Time,
        }
    }
}

/// Cube measure types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CubeMeasureType {
    Count,
    Sum,
    Avg,
    CountDistinct,
    CountDistinctApprox,
    Min,
    Max,
    Number,
}

impl CubeMeasureType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "count" => Some(CubeMeasureType::Count),
            "sum" => Some(CubeMeasureType::Sum),
            "avg" => Some(CubeMeasureType::Avg),
            "count_distinct" | "countdistinct" => Some(CubeMeasureType::CountDistinct),
            "count_distinct_approx" | "countdistinctapprox" => {
                Some(CubeMeasureType::CountDistinctApprox)
            }
            "min" => Some(CubeMeasureType::Min),
            "max" => Some(CubeMeasureType::Max),
            "number" => Some(CubeMeasureType::Number),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CubeMeasureType::Count => "count",
            CubeMeasureType::Sum => "sum",
            CubeMeasureType::Avg => "avg",
            CubeMeasureType::CountDistinct => "count_distinct",
            CubeMeasureType::CountDistinctApprox => "count_distinct_approx",
            CubeMeasureType::Min => "min",
            CubeMeasureType::Max => "max",
            CubeMeasureType::Number => "number",
        }
    }

    /// Reverse measure type table. Both distinct counts map to the exact one.
    pub fn to_lookml(self) -> MeasureType {
        match self {
            CubeMeasureType::Count => MeasureType::Count,
            CubeMeasureType::Sum => MeasureType::Sum,
            CubeMeasureType::Avg => MeasureType::Average,
            CubeMeasureType::CountDistinct | CubeMeasureType::CountDistinctApprox => {
                MeasureType::CountDistinct
            }
            CubeMeasureType::Min => MeasureType::Min,
            CubeMeasureType::Max => MeasureType::Max,
            CubeMeasureType::Number => MeasureType::Number,
        }
    }
}

/// Join cardinality, shared by both dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    #[default]
    ManyToOne,
    OneToMany,
    OneToOne,
    ManyToMany,
}

impl Relationship {
    /// Parse a LookML relationship, or one of Cube's older aliases
    /// (`belongsTo`, `hasMany`, `hasOne`).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace('-', "_").as_str() {
            "many_to_one" | "belongsto" | "belongs_to" => Some(Relationship::ManyToOne),
            "one_to_many" | "hasmany" | "has_many" => Some(Relationship::OneToMany),
            "one_to_one" | "hasone" | "has_one" => Some(Relationship::OneToOne),
            "many_to_many" => Some(Relationship::ManyToMany),
            _ => None,
        }
    }

    /// The same relationship seen from the other side.
    pub fn inverse(self) -> Self {
        match self {
            Relationship::ManyToOne => Relationship::OneToMany,
            Relationship::OneToMany => Relationship::ManyToOne,
            other => other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Relationship::ManyToOne => "many_to_one",
            Relationship::OneToMany => "one_to_many",
            Relationship::OneToOne => "one_to_one",
            Relationship::ManyToMany => "many_to_many",
        }
    }
}

impl std::fmt::Display for Relationship {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
