use http::header::HeaderName;

pub const HEADER_DIGEST: HeaderName = HeaderName::from_static("digest");
pub const HEADER_X_API_KEY: HeaderName = HeaderName::from_static("x-api-key");

/// Protocol version carried in every envelope.
pub const PROTOCOL_VERSION: &str = "2.0.0";
/// Message time-to-live carried in every envelope.
pub const MESSAGE_TTL: &str = "PT30S";

pub const DIGEST_ALGORITHM_TAG: &str = "BLAKE-512";
pub const SIGNATURE_ALGORITHM: &str = "xed25519";
pub const SIGNED_HEADERS: &str = "(created) (expires) digest";
/// Seconds between `created` and `expires` on every signature.
pub const SIGNATURE_VALIDITY_SECS: i64 = 600;

/// Core vocabulary shared by every catalogue item.
pub const CORE_CONTEXT: &str =
    "https://raw.githubusercontent.com/beckn/protocol-specifications-new/refs/heads/draft/schema/core/v2/context.jsonld";
/// Published base vocabulary for driver candidate items.
pub const DRIVER_BASE_CONTEXT: &str =
    "https://raw.githubusercontent.com/beckn/protocol-specifications-new/refs/heads/draft/schema/driver/v1/context.jsonld";
/// Driver candidate attributes as emitted by provider catalogues.
pub const DRIVER_CONTEXT: &str = "https://example.org/schema/driver/v1/context.jsonld";
/// Driver job attributes.
pub const JOB_CONTEXT: &str = "https://example.org/schema/driver-job/v1/context.jsonld";
