//! Well-known names shared across slices.

// OpenAPI tags
pub const SYSTEM_TAG: &str = "system";
pub const CLOUD_TAG: &str = "cloud";

// Permissions
pub const REGISTER_ON_CLOUD: &str = "register-on-cloud";
pub const MANAGE_CLOUD: &str = "manage-cloud";

// Roles
pub const ADMIN_ROLE: &str = "admin";

/// Setting keys persisted in the workspace settings store.
pub mod settings {
    /// Flag flipped once the workspace is registered with the cloud.
    pub const REGISTER_SERVER: &str = "Register_Server";
    pub const HAD_TRIAL: &str = "Cloud_Workspace_Had_Trial";
    /// Stable workspace identifier sent with every registration intent.
    pub const UNIQUE_ID: &str = "uniqueID";
    pub const REGISTRATION_PAYLOAD: &str = "Cloud_Workspace_Registration_Payload";

    pub const WORKSPACE_ID: &str = "Cloud_Workspace_Id";
    pub const WORKSPACE_NAME: &str = "Cloud_Workspace_Name";
    pub const CLIENT_ID: &str = "Cloud_Workspace_Client_Id";
    pub const CLIENT_SECRET: &str = "Cloud_Workspace_Client_Secret";
    pub const CLIENT_SECRET_EXPIRES_AT: &str = "Cloud_Workspace_Client_Secret_Expires_At";
    pub const REGISTRATION_CLIENT_URI: &str = "Cloud_Workspace_Registration_Client_Uri";
    pub const PUBLIC_KEY: &str = "Cloud_Workspace_PublicKey";
    pub const LICENSE: &str = "Cloud_Workspace_License";

    /// Registration payload fields copied into dedicated settings, as `(field, setting)`.
    pub const PAYLOAD_FIELDS: &[(&str, &str)] = &[
        ("workspaceId", WORKSPACE_ID),
        ("client_name", WORKSPACE_NAME),
        ("client_id", CLIENT_ID),
        ("client_secret", CLIENT_SECRET),
        ("client_secret_expires_at", CLIENT_SECRET_EXPIRES_AT),
        ("registration_client_uri", REGISTRATION_CLIENT_URI),
        ("publicKey", PUBLIC_KEY),
        ("licenseData", LICENSE),
    ];
}
