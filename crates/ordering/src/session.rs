//! The signed-in customer and their table.

use std::sync::Arc;

use common::TableNo;
use domain::{Customer, CustomerUpdate, NewCustomer, SessionKey, TableAssignment, ValidationError};
use session_store::{SessionStore, SessionStoreExt};

use crate::backend::RestaurantBackend;
use crate::error::Result;

/// Who is dining, as remembered by the session.
pub struct CustomerSession<S: SessionStore, B: RestaurantBackend> {
    store: Arc<S>,
    backend: Arc<B>,
}

impl<S: SessionStore, B: RestaurantBackend> CustomerSession<S, B> {
    pub fn new(store: Arc<S>, backend: Arc<B>) -> Self {
        Self { store, backend }
    }

    /// Returns the remembered customer, if any.
    pub fn current_customer(&self) -> Option<Customer> {
        self.store
            .load_as::<Customer>(SessionKey::Customer.as_str())
            .filter(|customer| !customer.id.is_blank())
    }

    /// Remembers `customer` without contacting the backend.
    pub fn begin(&self, customer: &Customer) {
        self.store.save_as(
            SessionKey::Customer.as_str(),
            customer,
            SessionKey::Customer.ttl(),
        );
    }

    /// Logs in and remembers the customer.
    #[tracing::instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<Customer> {
        let customer = self.backend.login(email, password).await?;
        self.begin(&customer);
        tracing::info!(customer_id = %customer.id, "customer signed in");
        Ok(customer)
    }

    /// Creates an account and signs in with it.
    #[tracing::instrument(skip(self, customer), fields(email = %customer.email))]
    pub async fn register(&self, customer: NewCustomer) -> Result<Customer> {
        let (email, password) = (customer.email.clone(), customer.password.clone());
        self.backend.register(customer).await?;
        tracing::info!("account created");
        self.login(&email, &password).await
    }

    /// Fetches the signed-in customer's profile and refreshes the remembered copy.
    #[tracing::instrument(skip(self))]
    pub async fn profile(&self) -> Result<Customer> {
        let current = self
            .current_customer()
            .ok_or(ValidationError::MissingCustomer)?;
        let customer = self.backend.fetch_customer(&current.id).await?;
        self.begin(&customer);
        Ok(customer)
    }

    /// Changes the signed-in customer's profile.
    #[tracing::instrument(skip(self, update))]
    pub async fn update_profile(&self, update: CustomerUpdate) -> Result<Customer> {
        let mut customer = self
            .current_customer()
            .ok_or(ValidationError::MissingCustomer)?;
        self.backend.update_customer(&customer.id, update.clone()).await?;

        customer.apply(&update);
        self.begin(&customer);
        tracing::info!(customer_id = %customer.id, "profile updated");
        Ok(customer)
    }

    /// Seats the remembered customer at `table_no`.
    #[tracing::instrument(skip(self), fields(table_no = %table_no))]
    pub async fn assign_table(&self, table_no: &TableNo) -> Result<()> {
        if table_no.is_blank() {
            return Err(ValidationError::MissingTableNumber.into());
        }
        let customer = self
            .current_customer()
            .ok_or(ValidationError::MissingCustomer)?;

        self.backend
            .update_table(table_no, TableAssignment::Assign(customer.id))
            .await?;
        Ok(())
    }

    /// Releases the customer's tables and forgets every session value.
    ///
    /// Table release is best effort; the session is cleared regardless.
    /// Returns the number of tables released.
    #[tracing::instrument(skip(self))]
    pub async fn end(&self) -> usize {
        let mut released = 0;

        if let Some(customer) = self.current_customer() {
            match self.backend.tables_for_customer(&customer.id).await {
                Ok(tables) => {
                    for table in tables {
                        match self
                            .backend
                            .update_table(&table.table_no, TableAssignment::Release)
                            .await
                        {
                            Ok(()) => released += 1,
                            Err(e) => tracing::warn!(
                                table_no = %table.table_no,
                                error = %e,
                                "failed to release table"
                            ),
                        }
                    }
                }
                Err(e) => tracing::warn!(error = %e, "failed to look up customer tables"),
            }
        }

        for key in SessionKey::ALL {
            self.store.clear(key.as_str());
        }
        tracing::info!(released, "session ended");
        released
    }
}

#[cfg(test)]
mod tests {
    use common::CustomerId;
    use session_store::InMemorySessionStore;

    use super::*;
    use crate::backend::InMemoryBackend;
    use crate::error::OrderError;

    fn session() -> (
        Arc<InMemorySessionStore>,
        Arc<InMemoryBackend>,
        CustomerSession<InMemorySessionStore, InMemoryBackend>,
    ) {
        let store = Arc::new(InMemorySessionStore::new());
        let backend = Arc::new(InMemoryBackend::new());
        let session = CustomerSession::new(store.clone(), backend.clone());
        (store, backend, session)
    }

    #[tokio::test]
    async fn test_login_remembers_customer() {
        let (_, backend, session) = session();
        backend.add_account("asha@example.com", "secret", Customer::new("C1"));

        session.login("asha@example.com", "secret").await.unwrap();

        assert_eq!(
            session.current_customer().map(|c| c.id),
            Some(CustomerId::new("C1"))
        );
    }

    #[tokio::test]
    async fn test_failed_login_remembers_nothing() {
        let (_, _, session) = session();
        assert!(session.login("nobody@example.com", "x").await.is_err());
        assert!(session.current_customer().is_none());
    }

    #[tokio::test]
    async fn test_assign_table_requires_customer() {
        let (_, backend, session) = session();
        backend.add_table("5");

        let result = session.assign_table(&TableNo::new("5")).await;

        assert_eq!(
            result,
            Err(OrderError::Validation(ValidationError::MissingCustomer))
        );
        assert_eq!(backend.call_count("update_table"), 0);
    }

    #[tokio::test]
    async fn test_end_releases_tables_and_clears_every_key() {
        let (store, backend, session) = session();
        backend.add_table("5");
        backend.add_table("6");
        session.begin(&Customer::new("C1"));
        session.assign_table(&TableNo::new("5")).await.unwrap();
        store.save(
            SessionKey::Cart.as_str(),
            serde_json::json!([]),
            SessionKey::Cart.ttl(),
        );

        let released = session.end().await;

        assert_eq!(released, 1);
        assert!(backend.table(&TableNo::new("5")).unwrap().is_available());
        for key in SessionKey::ALL {
            assert!(store.load(key.as_str()).is_none());
        }
    }

    #[tokio::test]
    async fn test_end_clears_session_even_if_backend_is_down() {
        let (store, backend, session) = session();
        session.begin(&Customer::new("C1"));
        backend.set_failing("tables_for_customer", true);

        assert_eq!(session.end().await, 0);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_register_signs_in() {
        let (_, backend, session) = session();
        let sign_up = NewCustomer::new("Asha", "asha@example.com", "pw", Some("98765")).unwrap();

        let customer = session.register(sign_up).await.unwrap();

        assert_eq!(session.current_customer(), Some(customer.clone()));
        assert_eq!(customer.name.as_deref(), Some("Asha"));
        assert_eq!(backend.call_count("register"), 1);
        assert_eq!(backend.call_count("login"), 1);
    }

    #[tokio::test]
    async fn test_failed_register_remembers_nothing() {
        let (_, backend, session) = session();
        backend.set_failing("register", true);
        let sign_up = NewCustomer::new("Asha", "asha@example.com", "pw", None).unwrap();

        assert!(session.register(sign_up).await.is_err());
        assert!(session.current_customer().is_none());
        assert_eq!(backend.call_count("login"), 0);
    }

    #[tokio::test]
    async fn test_profile_requires_customer() {
        let (_, backend, session) = session();
        assert_eq!(
            session.profile().await,
            Err(OrderError::Validation(ValidationError::MissingCustomer))
        );
        assert_eq!(backend.total_calls(), 0);
    }

    #[tokio::test]
    async fn test_update_profile_refreshes_remembered_customer() {
        let (_, backend, session) = session();
        let sign_up = NewCustomer::new("Asha", "asha@example.com", "pw", None).unwrap();
        let customer = session.register(sign_up).await.unwrap();

        let update = CustomerUpdate::new(Some("Asha R"), None, None).unwrap();
        let updated = session.update_profile(update).await.unwrap();

        assert_eq!(updated.name.as_deref(), Some("Asha R"));
        assert_eq!(session.current_customer(), Some(updated));
        let stored = backend.customer(&customer.id).unwrap();
        assert_eq!(stored.name.as_deref(), Some("Asha R"));
        assert_eq!(session.profile().await.unwrap().name.as_deref(), Some("Asha R"));
    }
}
