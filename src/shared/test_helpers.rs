//! In-memory stand-ins for Postgres, the object store and the identity provider.

use async_trait::async_trait;
use axum::Router;
use chrono::{DateTime, Duration, Utc};
use fake::faker::internet::en::SafeEmail;
use fake::Fake;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;
use uuid::Uuid;

use crate::core::config::{FileConfig, SessionConfig};
use crate::core::error::{AppError, Result};
use crate::core::router::{api_router, AppServices};
use crate::features::auth::clients::IdentityProvider;
use crate::features::auth::model::{
    AuthenticatedUser, ClientMetadata, ExternalAccount, ExternalIdentity, NewExternalAccount,
    NewSession, NewUser, Session, User,
};
use crate::features::auth::repositories::SessionRepository;
use crate::features::auth::{AuthService, SessionService};
use crate::features::files::models::{ExpiredFile, FileRecord, FileWithUploader, NewFileRecord};
use crate::features::files::repositories::FileRepository;
use crate::features::files::{ExpirationReconciler, FileService};
use crate::modules::storage::{ObjectStore, StoredObject};
use crate::shared::constants::GITHUB_PROVIDER;

pub fn session_config() -> SessionConfig {
    SessionConfig {
        cookie_name: "session.token".to_string(),
        ttl_days: 7,
        secure_cookie: false,
    }
}

pub fn github_identity(account_id: &str, email: Option<&str>) -> ExternalIdentity {
    ExternalIdentity {
        provider: GITHUB_PROVIDER.to_string(),
        account_id: account_id.to_string(),
        name: Some(format!("user-{}", account_id)),
        avatar_url: Some(format!(
            "https://avatars.githubusercontent.com/u/{}",
            account_id
        )),
        email: email.map(String::from),
        access_token: Some("gho_test".to_string()),
    }
}

pub fn random_email() -> String {
    SafeEmail().fake()
}

fn injected_fault() -> AppError {
    AppError::Database(sqlx::Error::PoolTimedOut)
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    accounts: Vec<ExternalAccount>,
    sessions: Vec<Session>,
    files: Vec<FileRecord>,
}

/// Postgres stand-in implementing both repositories over shared tables
#[derive(Default)]
pub struct InMemoryDatabase {
    tables: Mutex<Tables>,
    session_lookups: AtomicUsize,
    fail_session_lookups: AtomicBool,
    fail_file_inserts: AtomicBool,
    fail_download_increments: AtomicBool,
    fail_expired_deletes: AtomicBool,
    fail_expired_listing: AtomicBool,
}

impl InMemoryDatabase {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn tables(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().unwrap()
    }

    pub fn insert_user(&self, email: &str) -> User {
        let now = Utc::now();
        let user = User {
            id: Uuid::now_v7(),
            email: email.to_string(),
            name: None,
            image: None,
            created_at: now,
            updated_at: now,
        };
        self.tables().users.push(user.clone());
        user
    }

    pub fn user_count(&self) -> usize {
        self.tables().users.len()
    }

    /// Number of session lookups that reached the store
    pub fn session_lookups(&self) -> usize {
        self.session_lookups.load(Ordering::SeqCst)
    }

    pub fn expire_session(&self, id: &str) {
        if let Some(session) = self.tables().sessions.iter_mut().find(|s| s.id == id) {
            session.expires_at = Utc::now() - Duration::seconds(1);
        }
    }

    pub fn file_count(&self) -> usize {
        self.tables().files.len()
    }

    pub fn find_file(&self, id: Uuid) -> Option<FileRecord> {
        self.tables().files.iter().find(|f| f.id == id).cloned()
    }

    pub fn set_file_expires_at(&self, id: Uuid, expires_at: DateTime<Utc>) {
        if let Some(file) = self.tables().files.iter_mut().find(|f| f.id == id) {
            file.expires_at = expires_at;
        }
    }

    pub fn set_file_created_at(&self, id: Uuid, created_at: DateTime<Utc>) {
        if let Some(file) = self.tables().files.iter_mut().find(|f| f.id == id) {
            file.created_at = created_at;
        }
    }

    pub fn fail_session_lookups(&self) {
        self.fail_session_lookups.store(true, Ordering::SeqCst);
    }

    pub fn fail_file_inserts(&self) {
        self.fail_file_inserts.store(true, Ordering::SeqCst);
    }

    pub fn fail_download_increments(&self) {
        self.fail_download_increments.store(true, Ordering::SeqCst);
    }

    pub fn fail_expired_deletes(&self) {
        self.fail_expired_deletes.store(true, Ordering::SeqCst);
    }

    pub fn fail_expired_listing(&self) {
        self.fail_expired_listing.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl SessionRepository for InMemoryDatabase {
    async fn find_live_identity(
        &self,
        session_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<AuthenticatedUser>> {
        self.session_lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail_session_lookups.load(Ordering::SeqCst) {
            return Err(injected_fault());
        }

        let tables = self.tables();
        let identity = tables
            .sessions
            .iter()
            .find(|s| s.id == session_id && s.expires_at > now)
            .and_then(|s| {
                tables
                    .users
                    .iter()
                    .find(|u| u.id == s.user_id)
                    .map(|u| AuthenticatedUser {
                        user_id: u.id,
                        email: u.email.clone(),
                        name: u.name.clone(),
                        image: u.image.clone(),
                        session_id: s.id.clone(),
                    })
            });

        Ok(identity)
    }

    async fn find_account(
        &self,
        provider: &str,
        provider_account_id: &str,
    ) -> Result<Option<ExternalAccount>> {
        Ok(self
            .tables()
            .accounts
            .iter()
            .find(|a| a.provider == provider && a.provider_account_id == provider_account_id)
            .cloned())
    }

    async fn upsert_user_by_email(&self, user: NewUser) -> Result<User> {
        let mut tables = self.tables();
        if let Some(existing) = tables.users.iter().find(|u| u.email == user.email) {
            return Ok(existing.clone());
        }

        let now = Utc::now();
        let created = User {
            id: Uuid::now_v7(),
            email: user.email,
            name: user.name,
            image: user.image,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(created.clone());
        Ok(created)
    }

    async fn upsert_account(&self, account: NewExternalAccount) -> Result<ExternalAccount> {
        let mut tables = self.tables();
        let now = Utc::now();

        if let Some(existing) = tables.accounts.iter_mut().find(|a| {
            a.provider == account.provider && a.provider_account_id == account.provider_account_id
        }) {
            if account.access_token.is_some() {
                existing.access_token = account.access_token;
            }
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let created = ExternalAccount {
            id: Uuid::now_v7(),
            provider: account.provider,
            provider_account_id: account.provider_account_id,
            user_id: account.user_id,
            access_token: account.access_token,
            refresh_token: None,
            id_token: None,
            token_expires_at: None,
            created_at: now,
            updated_at: now,
        };
        tables.accounts.push(created.clone());
        Ok(created)
    }

    async fn create_session(&self, session: NewSession) -> Result<Session> {
        let mut tables = self.tables();
        if tables.sessions.iter().any(|s| s.id == session.id) {
            return Err(AppError::Conflict("duplicate session id".to_string()));
        }

        let now = Utc::now();
        let created = Session {
            id: session.id,
            user_id: session.user_id,
            expires_at: session.expires_at,
            ip_address: session.client.ip_address,
            user_agent: session.client.user_agent,
            created_at: now,
            updated_at: now,
        };
        tables.sessions.push(created.clone());
        Ok(created)
    }

    async fn delete_session(&self, session_id: &str) -> Result<bool> {
        let mut tables = self.tables();
        let before = tables.sessions.len();
        tables.sessions.retain(|s| s.id != session_id);
        Ok(tables.sessions.len() < before)
    }
}

#[async_trait]
impl FileRepository for InMemoryDatabase {
    async fn insert(&self, file: NewFileRecord) -> Result<FileRecord> {
        if self.fail_file_inserts.load(Ordering::SeqCst) {
            return Err(injected_fault());
        }

        let mut tables = self.tables();
        if tables.files.iter().any(|f| f.object_key == file.object_key) {
            return Err(AppError::Conflict(
                "Record violates unique constraint 'files_object_key_unique'".to_string(),
            ));
        }
        if !tables.users.iter().any(|u| u.id == file.owner_id) {
            return Err(AppError::BadRequest(
                "Referenced record does not exist.".to_string(),
            ));
        }

        let record = FileRecord {
            id: Uuid::new_v4(),
            owner_id: file.owner_id,
            filename: file.filename,
            content_type: file.content_type,
            size_bytes: file.size_bytes,
            object_key: file.object_key,
            expires_at: file.expires_at,
            download_count: 0,
            created_at: Utc::now(),
        };
        tables.files.push(record.clone());
        Ok(record)
    }

    async fn find_with_uploader(&self, id: Uuid) -> Result<Option<FileWithUploader>> {
        let tables = self.tables();
        let joined = tables.files.iter().find(|f| f.id == id).and_then(|f| {
            tables
                .users
                .iter()
                .find(|u| u.id == f.owner_id)
                .map(|u| FileWithUploader {
                    file: f.clone(),
                    uploader_email: u.email.clone(),
                    uploader_name: u.name.clone(),
                    uploader_image: u.image.clone(),
                })
        });
        Ok(joined)
    }

    async fn find_expires_at(&self, id: Uuid) -> Result<Option<DateTime<Utc>>> {
        Ok(self
            .tables()
            .files
            .iter()
            .find(|f| f.id == id)
            .map(|f| f.expires_at))
    }

    async fn delete_owned(&self, id: Uuid, owner_id: Uuid) -> Result<bool> {
        let mut tables = self.tables();
        let before = tables.files.len();
        tables
            .files
            .retain(|f| !(f.id == id && f.owner_id == owner_id));
        Ok(tables.files.len() < before)
    }

    async fn delete_expired(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool> {
        if self.fail_expired_deletes.load(Ordering::SeqCst) {
            return Err(injected_fault());
        }

        let mut tables = self.tables();
        let before = tables.files.len();
        tables
            .files
            .retain(|f| !(f.id == id && f.expires_at <= now));
        Ok(tables.files.len() < before)
    }

    async fn increment_download_count(&self, id: Uuid) -> Result<bool> {
        if self.fail_download_increments.load(Ordering::SeqCst) {
            return Err(injected_fault());
        }

        let mut tables = self.tables();
        match tables.files.iter_mut().find(|f| f.id == id) {
            Some(file) => {
                file.download_count += 1;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_active_for_owner(
        &self,
        owner_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<FileRecord>> {
        let mut files: Vec<FileRecord> = self
            .tables()
            .files
            .iter()
            .filter(|f| f.owner_id == owner_id && f.expires_at > now)
            .cloned()
            .collect();
        files.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(files)
    }

    async fn list_expired(&self, now: DateTime<Utc>) -> Result<Vec<ExpiredFile>> {
        if self.fail_expired_listing.load(Ordering::SeqCst) {
            return Err(injected_fault());
        }

        Ok(self
            .tables()
            .files
            .iter()
            .filter(|f| f.expires_at <= now)
            .map(|f| ExpiredFile {
                id: f.id,
                object_key: f.object_key.clone(),
            })
            .collect())
    }
}

/// Bucket stand-in with per-key delete failures and a switch to hide objects from `head`
#[derive(Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, StoredObject>>,
    failing_deletes: Mutex<HashSet<String>>,
    hidden: AtomicBool,
}

impl MemoryObjectStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn remove(&self, key: &str) {
        self.objects.lock().unwrap().remove(key);
    }

    pub fn fail_deletes_for(&self, key: &str) {
        self.failing_deletes.lock().unwrap().insert(key.to_string());
    }

    pub fn clear_failures(&self) {
        self.failing_deletes.lock().unwrap().clear();
        self.hidden.store(false, Ordering::SeqCst);
    }

    /// Make `head` report every object as missing
    pub fn hide_objects(&self) {
        self.hidden.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<()> {
        let object = StoredObject {
            size: data.len() as u64,
            body: data,
            content_type: Some(content_type.to_string()),
        };
        self.objects.lock().unwrap().insert(key.to_string(), object);
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<StoredObject>> {
        Ok(self.objects.lock().unwrap().get(key).cloned())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        if self.failing_deletes.lock().unwrap().contains(key) {
            return Err(AppError::Storage(format!(
                "Failed to delete file '{}': status 503",
                key
            )));
        }
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    async fn head(&self, key: &str) -> Result<bool> {
        if self.hidden.load(Ordering::SeqCst) {
            return Ok(false);
        }
        Ok(self.contains(key))
    }
}

/// Identity provider returning a canned identity, or failing every exchange
pub struct FakeIdentityProvider {
    identity: Option<ExternalIdentity>,
}

impl FakeIdentityProvider {
    pub fn new(identity: ExternalIdentity) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    pub fn failing() -> Self {
        Self { identity: None }
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    fn provider_name(&self) -> &str {
        GITHUB_PROVIDER
    }

    fn authorization_url(&self, state: &str) -> String {
        format!("https://github.test/login/oauth/authorize?state={}", state)
    }

    async fn exchange_code(&self, _code: &str) -> Result<ExternalIdentity> {
        self.identity.clone().ok_or_else(|| {
            AppError::ExternalServiceError("GitHub rejected authorization code".to_string())
        })
    }
}

/// Full API router over in-memory stores
pub struct TestApp {
    pub db: Arc<InMemoryDatabase>,
    pub store: Arc<MemoryObjectStore>,
    pub services: AppServices,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_identity(FakeIdentityProvider::new(github_identity(
            "1001",
            Some("octocat@example.com"),
        )))
    }

    pub fn with_identity(identity: FakeIdentityProvider) -> Self {
        let db = InMemoryDatabase::new();
        let store = MemoryObjectStore::new();

        let sessions = Arc::new(SessionService::new(db.clone(), session_config()));
        let auth = Arc::new(AuthService::new(Arc::new(identity), Arc::clone(&sessions)));
        let files = Arc::new(FileService::new(
            db.clone(),
            store.clone(),
            FileConfig::default(),
        ));
        let reconciler = Arc::new(ExpirationReconciler::new(
            db.clone(),
            store.clone(),
            StdDuration::from_secs(3600),
        ));

        Self {
            db,
            store,
            services: AppServices {
                auth,
                sessions,
                files,
                reconciler,
            },
        }
    }

    pub fn router(&self, cleanup_credentials: Option<&str>) -> Router {
        api_router(&self.services, cleanup_credentials.map(String::from))
    }

    /// Sign a fresh GitHub identity in and return the `Cookie` header value for it
    pub async fn sign_in(&self, account_id: &str, email: &str) -> (Session, String) {
        let session = self
            .services
            .sessions
            .sign_in(
                &github_identity(account_id, Some(email)),
                ClientMetadata::default(),
            )
            .await
            .unwrap();
        let cookie = format!("session.token={}", session.id);
        (session, cookie)
    }
}
