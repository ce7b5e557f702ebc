use serde::Serializer;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

pub fn serialize_offset_datetime<S>(dt: &Option<OffsetDateTime>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match dt {
        Some(value) => {
            let formatted = value
                .format(&Rfc3339)
                .unwrap_or_else(|_| "Invalid Date".to_string());
            serializer.serialize_str(&formatted)
        }
        None => serializer.serialize_none(),
    }
}
