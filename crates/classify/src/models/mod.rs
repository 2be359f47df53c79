mod category;
mod classification;
mod record;

pub use self::category::Category;
pub use self::classification::Classification;
pub use self::record::MetadataRecord;
