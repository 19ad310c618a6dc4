#[derive(serde::Serialize, serde::Deserialize, Clone, Debug)]
pub struct Claims {
    pub sub: String, // user ID
    pub exp: i64,    // expiration timestamp
    pub jti: String, // distinguishes tokens minted in the same second
}
