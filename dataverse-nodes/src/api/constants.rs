//! Fixed values of the Azure AD and Dataverse Web API contracts

/// Azure AD authority used when no override is configured
pub const DEFAULT_AUTHORITY: &str = "https://login.microsoftonline.com";

/// Web API path appended to the environment URL
pub const API_PATH: &str = "/api/data/v9.2";

/// Token lifetime assumed when the token endpoint omits `expires_in`
pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 3600;

pub const ODATA_MAX_PAGE_SIZE: &str = "5000";

/// Headers attached to every Web API request besides `Authorization`
pub const DEFAULT_HEADERS: &[(&str, &str)] = &[
    ("OData-MaxPageSize", ODATA_MAX_PAGE_SIZE),
    ("OData-MaxVersion", "4.0"),
    ("OData-Version", "4.0"),
    ("Content-Type", "application/json"),
    ("Accept", "application/json"),
    ("Prefer", "odata.include-annotations=\"*\""),
];
