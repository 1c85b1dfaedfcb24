//! Identity side of the wishlist: who is signed in, and how they sign in.

mod api;
mod error;
mod model;
mod provider;
mod token;
mod token_manager;
mod token_provider;

#[doc(inline)]
pub use api::IdentityToolkitAuth;

#[doc(inline)]
pub use error::{AuthError, AuthResult};

#[doc(inline)]
pub use model::{
    SignInWithPasswordRequest, SignInWithPasswordResponse, SignUpRequest, SignUpResponse, User,
    UserInfo, EMAIL_PASSWORD_PROVIDER_ID,
};

#[doc(inline)]
pub use provider::{IdentityProvider, InMemoryIdentityProvider};

#[doc(inline)]
pub use token::RefreshTokenResponse;

#[doc(inline)]
pub use token_manager::{TokenManager, TokenUpdate};

#[doc(inline)]
pub use token_provider::AuthTokenProvider;
