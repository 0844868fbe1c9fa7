pub mod config;
pub mod lookup;
pub mod policy;
pub mod role;

pub const APP_NAME: &str = "openmetadata";
// config map keys
pub const CONFIG_ENDPOINT: &str = "endpoint";
pub const CONFIG_TOKEN: &str = "token";
pub const CONFIG_LOOKUP_USER: &str = "lookup.user";
pub const CONFIG_LOOKUP_PRINCIPAL: &str = "ranger.lookup.kerberos.principal";
pub const CONFIG_CONNECT_TIMEOUT_MS: &str = "connect.timeout.ms";
pub const CONFIG_REQUEST_TIMEOUT_MS: &str = "request.timeout.ms";
pub const CONFIG_LOOKUP_PAGE_SIZE: &str = "lookup.page.size";
// defaults
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;
pub const DEFAULT_LOOKUP_PAGE_SIZE: u32 = 100;
pub const MAX_LOOKUP_PAGE_SIZE: u32 = 1_000;
// policy items
pub const ADMIN_USER: &str = "admin";
// resource names
pub const RESOURCE_BOT: &str = "bot";
pub const RESOURCE_WEBHOOK: &str = "webhook";
// access types
pub const ACCESS_VIEW_ALL: &str = "ViewAll";
pub const ACCESS_EDIT_DESCRIPTION: &str = "EditDescription";
pub const ACCESS_EDIT_DISPLAY_NAME: &str = "EditDisplayName";
pub const ACCESS_EDIT_LINEAGE: &str = "EditLineage";
pub const ACCESS_EDIT_OWNER: &str = "EditOwner";
pub const ACCESS_EDIT_TAGS: &str = "EditTags";
pub const ACCESS_CREATE: &str = "create";
pub const ACCESS_DELETE: &str = "delete";
