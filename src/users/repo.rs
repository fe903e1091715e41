use anyhow::Context;
use axum::async_trait;
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use std::sync::Mutex;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::nutrition::NutritionTargets;

use super::repo_types::{NewUser, ProfileUpdate, Role, User, WeightEntry};

/// Durable store of accounts and their weight history. The weight ledger
/// lives here because it is owned one-to-one by the account (and is removed
/// with it), unlike plans which have their own store.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create(&self, new_user: NewUser) -> anyhow::Result<User>;
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>>;
    async fn list(&self) -> anyhow::Result<Vec<User>>;
    async fn update_profile(&self, id: Uuid, update: ProfileUpdate)
        -> anyhow::Result<Option<User>>;
    /// Update the stored weight together with the targets derived from it.
    async fn set_weight(
        &self,
        id: Uuid,
        weight_kg: f64,
        targets: NutritionTargets,
    ) -> anyhow::Result<Option<User>>;
    async fn set_role(&self, id: Uuid, role: Role) -> anyhow::Result<bool>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
    async fn count(&self) -> anyhow::Result<i64>;

    /// Insert or replace the weight entry for the given calendar date.
    async fn upsert_weight_entry(&self, id: Uuid, entry: WeightEntry) -> anyhow::Result<()>;
    /// Weight history, newest first.
    async fn weight_history(&self, id: Uuid) -> anyhow::Result<Vec<WeightEntry>>;
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    role: String,
    age: Option<i32>,
    gender: Option<String>,
    height_cm: Option<f64>,
    weight_kg: Option<f64>,
    activity_level: Option<String>,
    goal: Option<String>,
    daily_calories: Option<i32>,
    daily_protein: Option<i32>,
    daily_water: Option<f64>,
    created_at: OffsetDateTime,
}

impl UserRow {
    fn into_user(self) -> User {
        User {
            id: self.id,
            name: self.name,
            email: self.email,
            password_hash: self.password_hash,
            role: self.role.parse().unwrap_or(Role::User),
            age: self.age,
            gender: self.gender.and_then(|s| s.parse().ok()),
            height_cm: self.height_cm,
            weight_kg: self.weight_kg,
            activity_level: self.activity_level.and_then(|s| s.parse().ok()),
            goal: self.goal.and_then(|s| s.parse().ok()),
            daily_calories: self.daily_calories,
            daily_protein: self.daily_protein,
            daily_water: self.daily_water,
            created_at: self.created_at,
        }
    }
}

const USER_COLUMNS: &str = "id, name, email, password_hash, role, age, gender, height_cm, \
     weight_kg, activity_level, goal, daily_calories, daily_protein, daily_water, created_at";

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, new_user: NewUser) -> anyhow::Result<User> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            INSERT INTO users (name, email, password_hash, role, age, gender, height_cm,
                               weight_kg, activity_level, goal, daily_calories,
                               daily_protein, daily_water)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(new_user.role.as_str())
        .bind(new_user.metrics.age)
        .bind(new_user.metrics.gender.as_str())
        .bind(new_user.metrics.height_cm)
        .bind(new_user.metrics.weight_kg)
        .bind(new_user.metrics.activity_level.as_str())
        .bind(new_user.metrics.goal.as_str())
        .bind(new_user.targets.daily_calories)
        .bind(new_user.targets.daily_protein)
        .bind(new_user.targets.daily_water)
        .fetch_one(&self.db)
        .await
        .context("create user")?;
        Ok(row.into_user())
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"SELECT {USER_COLUMNS} FROM users WHERE email = $1"#
        ))
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("find user by email")?;
        Ok(row.map(UserRow::into_user))
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"SELECT {USER_COLUMNS} FROM users WHERE id = $1"#
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find user by id")?;
        Ok(row.map(UserRow::into_user))
    }

    async fn list(&self) -> anyhow::Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            r#"SELECT {USER_COLUMNS} FROM users ORDER BY created_at ASC"#
        ))
        .fetch_all(&self.db)
        .await
        .context("list users")?;
        Ok(rows.into_iter().map(UserRow::into_user).collect())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        update: ProfileUpdate,
    ) -> anyhow::Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
            SET name = $2, age = $3, gender = $4, height_cm = $5, weight_kg = $6,
                activity_level = $7, goal = $8, daily_calories = $9,
                daily_protein = $10, daily_water = $11
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&update.name)
        .bind(update.metrics.age)
        .bind(update.metrics.gender.as_str())
        .bind(update.metrics.height_cm)
        .bind(update.metrics.weight_kg)
        .bind(update.metrics.activity_level.as_str())
        .bind(update.metrics.goal.as_str())
        .bind(update.targets.daily_calories)
        .bind(update.targets.daily_protein)
        .bind(update.targets.daily_water)
        .fetch_optional(&self.db)
        .await
        .context("update profile")?;
        Ok(row.map(UserRow::into_user))
    }

    async fn set_weight(
        &self,
        id: Uuid,
        weight_kg: f64,
        targets: NutritionTargets,
    ) -> anyhow::Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            r#"
            UPDATE users
            SET weight_kg = $2, daily_calories = $3, daily_protein = $4, daily_water = $5
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(weight_kg)
        .bind(targets.daily_calories)
        .bind(targets.daily_protein)
        .bind(targets.daily_water)
        .fetch_optional(&self.db)
        .await
        .context("set weight")?;
        Ok(row.map(UserRow::into_user))
    }

    async fn set_role(&self, id: Uuid, role: Role) -> anyhow::Result<bool> {
        let result = sqlx::query(r#"UPDATE users SET role = $2 WHERE id = $1"#)
            .bind(id)
            .bind(role.as_str())
            .execute(&self.db)
            .await
            .context("set role")?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        // weight_history rows go with the account via ON DELETE CASCADE.
        let result = sqlx::query(r#"DELETE FROM users WHERE id = $1"#)
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete user")?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> anyhow::Result<i64> {
        let (count,): (i64,) = sqlx::query_as(r#"SELECT COUNT(*) FROM users"#)
            .fetch_one(&self.db)
            .await
            .context("count users")?;
        Ok(count)
    }

    async fn upsert_weight_entry(&self, id: Uuid, entry: WeightEntry) -> anyhow::Result<()> {
        sqlx::query(
            r#"
            INSERT INTO weight_history (user_id, date, weight_kg)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, date) DO UPDATE SET weight_kg = EXCLUDED.weight_kg
            "#,
        )
        .bind(id)
        .bind(entry.date)
        .bind(entry.weight_kg)
        .execute(&self.db)
        .await
        .context("upsert weight entry")?;
        Ok(())
    }

    async fn weight_history(&self, id: Uuid) -> anyhow::Result<Vec<WeightEntry>> {
        let rows: Vec<(time::Date, f64)> = sqlx::query_as(
            r#"
            SELECT date, weight_kg
            FROM weight_history
            WHERE user_id = $1
            ORDER BY date DESC
            "#,
        )
        .bind(id)
        .fetch_all(&self.db)
        .await
        .context("weight history")?;
        Ok(rows
            .into_iter()
            .map(|(date, weight_kg)| WeightEntry { date, weight_kg })
            .collect())
    }
}

/// In-memory user store used by `AppState::fake()` and unit tests.
#[derive(Default)]
pub struct MemoryUserStore {
    inner: Mutex<MemoryUserInner>,
}

#[derive(Default)]
struct MemoryUserInner {
    users: HashMap<Uuid, User>,
    weights: HashMap<Uuid, Vec<WeightEntry>>,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, new_user: NewUser) -> anyhow::Result<User> {
        let mut inner = self.inner.lock().unwrap();
        if inner
            .users
            .values()
            .any(|user| user.email == new_user.email)
        {
            anyhow::bail!("duplicate email: {}", new_user.email);
        }
        let user = User {
            id: Uuid::new_v4(),
            name: new_user.name,
            email: new_user.email,
            password_hash: new_user.password_hash,
            role: new_user.role,
            age: Some(new_user.metrics.age),
            gender: Some(new_user.metrics.gender),
            height_cm: Some(new_user.metrics.height_cm),
            weight_kg: Some(new_user.metrics.weight_kg),
            activity_level: Some(new_user.metrics.activity_level),
            goal: Some(new_user.metrics.goal),
            daily_calories: Some(new_user.targets.daily_calories),
            daily_protein: Some(new_user.targets.daily_protein),
            daily_water: Some(new_user.targets.daily_water),
            created_at: OffsetDateTime::now_utc(),
        };
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        Ok(self.inner.lock().unwrap().users.get(&id).cloned())
    }

    async fn list(&self) -> anyhow::Result<Vec<User>> {
        let inner = self.inner.lock().unwrap();
        let mut users: Vec<User> = inner.users.values().cloned().collect();
        users.sort_by_key(|user| user.created_at);
        Ok(users)
    }

    async fn update_profile(
        &self,
        id: Uuid,
        update: ProfileUpdate,
    ) -> anyhow::Result<Option<User>> {
        let mut inner = self.inner.lock().unwrap();
        let Some(user) = inner.users.get_mut(&id) else {
            return Ok(None);
        };
        user.name = update.name;
        user.age = Some(update.metrics.age);
        user.gender = Some(update.metrics.gender);
        user.height_cm = Some(update.metrics.height_cm);
        user.weight_kg = Some(update.metrics.weight_kg);
        user.activity_level = Some(update.metrics.activity_level);
        user.goal = Some(update.metrics.goal);
        user.daily_calories = Some(update.targets.daily_calories);
        user.daily_protein = Some(update.targets.daily_protein);
        user.daily_water = Some(update.targets.daily_water);
        Ok(Some(user.clone()))
    }

    async fn set_weight(
        &self,
        id: Uuid,
        weight_kg: f64,
        targets: NutritionTargets,
    ) -> anyhow::Result<Option<User>> {
        let mut inner = self.inner.lock().unwrap();
        let Some(user) = inner.users.get_mut(&id) else {
            return Ok(None);
        };
        user.weight_kg = Some(weight_kg);
        user.daily_calories = Some(targets.daily_calories);
        user.daily_protein = Some(targets.daily_protein);
        user.daily_water = Some(targets.daily_water);
        Ok(Some(user.clone()))
    }

    async fn set_role(&self, id: Uuid, role: Role) -> anyhow::Result<bool> {
        let mut inner = self.inner.lock().unwrap();
        match inner.users.get_mut(&id) {
            Some(user) => {
                user.role = role;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        let mut inner = self.inner.lock().unwrap();
        inner.weights.remove(&id);
        Ok(inner.users.remove(&id).is_some())
    }

    async fn count(&self) -> anyhow::Result<i64> {
        Ok(self.inner.lock().unwrap().users.len() as i64)
    }

    async fn upsert_weight_entry(&self, id: Uuid, entry: WeightEntry) -> anyhow::Result<()> {
        let mut inner = self.inner.lock().unwrap();
        let history = inner.weights.entry(id).or_default();
        match history.iter_mut().find(|e| e.date == entry.date) {
            Some(existing) => existing.weight_kg = entry.weight_kg,
            None => history.push(entry),
        }
        Ok(())
    }

    async fn weight_history(&self, id: Uuid) -> anyhow::Result<Vec<WeightEntry>> {
        let inner = self.inner.lock().unwrap();
        let mut history = inner.weights.get(&id).cloned().unwrap_or_default();
        history.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(history)
    }
}
