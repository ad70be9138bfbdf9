pub mod admin;
pub mod auth;
pub mod bookings;
pub mod coaches;
pub mod health;
pub mod journals;
pub mod psych_tests;
pub mod routes;
pub mod users;

use sqlx::PgPool;

use crate::auth::{AuthService, JwtService};
use crate::config::{AppConfig, SmtpConfig};
use crate::services::{
    AdminService, BookingService, CoachService, EmailService, JournalService, PsychService,
    SlotService, UserService,
};

/// Shared handler state. Services are thin wrappers over the pool, so they
/// are built on demand rather than stored.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: AppConfig,
    pub auth: AuthService,
}

impl AppState {
    pub fn new(db: PgPool, config: AppConfig, smtp: SmtpConfig) -> Self {
        let mailer = EmailService::new(smtp, config.public_base_url.clone(), config.dev_mode);
        let jwt = JwtService::new(&config.jwt_secret);
        let auth = AuthService::new(db.clone(), jwt, mailer);
        Self { db, config, auth }
    }

    pub fn users(&self) -> UserService {
        UserService::new(self.db.clone())
    }

    pub fn coaches(&self) -> CoachService {
        CoachService::new(self.db.clone())
    }

    pub fn slots(&self) -> SlotService {
        SlotService::new(self.db.clone())
    }

    pub fn bookings(&self) -> BookingService {
        BookingService::new(self.db.clone())
    }

    pub fn journals(&self) -> JournalService {
        JournalService::new(self.db.clone())
    }

    pub fn psych(&self) -> PsychService {
        PsychService::new(self.db.clone())
    }

    pub fn admin(&self) -> AdminService {
        AdminService::new(self.db.clone())
    }
}
