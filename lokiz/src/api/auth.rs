use log::info;

use super::types::{AccountUser, TokenResponse, UpdateProfileRequest};
use super::{ApiClient, ApiError};
use crate::validation::{LoginForm, RegisterForm};

impl ApiClient {
    /// Validates locally, registers, and signs the session in.
    pub async fn register(&self, form: &RegisterForm) -> Result<AccountUser, ApiError> {
        let req = form.validate()?;
        let token: TokenResponse = self.fetch(self.post("/auth/register").json(&req)).await?;
        info!("registered {}", token.user.username);
        self.sign_in(token)
    }

    pub async fn login(&self, form: &LoginForm) -> Result<AccountUser, ApiError> {
        let req = form.validate()?;
        let token: TokenResponse = self.fetch(self.post("/auth/login").json(&req)).await?;
        self.sign_in(token)
    }

    fn sign_in(&self, token: TokenResponse) -> Result<AccountUser, ApiError> {
        self.session.set_auth(token.user.clone(), token.access_token)?;
        Ok(token.user)
    }

    pub fn logout(&self) -> Result<(), ApiError> {
        Ok(self.session.clear()?)
    }

    /// Fetches the account and refreshes the stored copy.
    pub async fn me(&self) -> Result<AccountUser, ApiError> {
        let user: AccountUser = self.fetch(self.get("/auth/me")).await?;
        let fresh = user.clone();
        self.session.update_user(move |u| *u = fresh)?;
        Ok(user)
    }

    pub async fn update_profile(&self, req: &UpdateProfileRequest) -> Result<AccountUser, ApiError> {
        let user: AccountUser = self.fetch(self.patch("/auth/me").json(req)).await?;
        let fresh = user.clone();
        self.session.update_user(move |u| *u = fresh)?;
        Ok(user)
    }
}
