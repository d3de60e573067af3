// Pipeline processing: business-rule filtering and field parsing

pub mod eligibility;
pub mod timestamps;
