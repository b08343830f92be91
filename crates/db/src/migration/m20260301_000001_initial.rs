//! Initial database migration.
//!
//! Creates the identity store, relationship graph, expense and currency
//! tables, plus triggers and seed data.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: IDENTITY STORE
        // ============================================================
        db.execute_unprepared(USERS_SQL).await?;

        // ============================================================
        // PART 2: RELATIONSHIP GRAPH
        // ============================================================
        db.execute_unprepared(FAMILY_LINKS_SQL).await?;
        db.execute_unprepared(FAMILY_REQUESTS_SQL).await?;

        // ============================================================
        // PART 3: CURRENCIES & EXPENSES
        // ============================================================
        db.execute_unprepared(CURRENCIES_SQL).await?;
        db.execute_unprepared(EXPENSES_SQL).await?;

        // ============================================================
        // PART 4: TRIGGERS & FUNCTIONS
        // ============================================================
        db.execute_unprepared(TRIGGERS_SQL).await?;

        // ============================================================
        // PART 5: SEED DATA
        // ============================================================
        db.execute_unprepared(SEED_CURRENCIES_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const USERS_SQL: &str = r"
-- Identity store: credentials, profile, category preferences
CREATE TABLE users (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    email VARCHAR(255) NOT NULL UNIQUE,
    password_hash VARCHAR(255) NOT NULL,
    display_name VARCHAR(120) NOT NULL,
    gender VARCHAR(32),
    location VARCHAR(255),
    website VARCHAR(255),
    categories TEXT[] NOT NULL DEFAULT '{}',
    is_active BOOLEAN NOT NULL DEFAULT true,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_users_email ON users(lower(email));
";

const FAMILY_LINKS_SQL: &str = r"
-- Symmetric family edge stored as one directed row per direction.
-- Both rows of an edge are written in a single transaction; deleting a user
-- cascades both directions, purging the account from everyone's family.
CREATE TABLE family_links (
    user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    member_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    PRIMARY KEY (user_id, member_id),
    CONSTRAINT chk_no_self_link CHECK (user_id <> member_id)
);

-- Reverse-direction lookup for reconcile-on-read
CREATE INDEX idx_family_links_member ON family_links(member_id);
";

const FAMILY_REQUESTS_SQL: &str = r"
-- Pending one-directional link proposals, stored on the target identity
CREATE TABLE family_requests (
    target_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    requester_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    PRIMARY KEY (target_id, requester_id),
    CONSTRAINT chk_no_self_request CHECK (target_id <> requester_id)
);

CREATE INDEX idx_family_requests_requester ON family_requests(requester_id);
";

const CURRENCIES_SQL: &str = r"
-- Currency reference data (ISO 4217)
CREATE TABLE currencies (
    code VARCHAR(3) PRIMARY KEY,
    name VARCHAR(100) NOT NULL,
    symbol VARCHAR(8) NOT NULL,
    decimal_places SMALLINT NOT NULL DEFAULT 2
);
";

const EXPENSES_SQL: &str = r"
-- Expenses, owned exclusively by their creator
CREATE TABLE expenses (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    amount NUMERIC(15, 2) NOT NULL CHECK (amount > 0),
    date DATE NOT NULL,
    category VARCHAR(120) NOT NULL,
    currency_code VARCHAR(3) NOT NULL REFERENCES currencies(code),
    comment TEXT,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

-- Visibility queries filter by owner set and sort by date
CREATE INDEX idx_expenses_owner_date ON expenses(owner_id, date DESC, updated_at DESC);
";

const TRIGGERS_SQL: &str = r"
-- Keep updated_at current on row modification
CREATE OR REPLACE FUNCTION set_updated_at()
RETURNS TRIGGER AS $$
BEGIN
    NEW.updated_at = now();
    RETURN NEW;
END;
$$ LANGUAGE plpgsql;

CREATE TRIGGER trg_users_updated_at
    BEFORE UPDATE ON users
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();

CREATE TRIGGER trg_expenses_updated_at
    BEFORE UPDATE ON expenses
    FOR EACH ROW EXECUTE FUNCTION set_updated_at();
";

const SEED_CURRENCIES_SQL: &str = r"
INSERT INTO currencies (code, name, symbol, decimal_places) VALUES
    ('USD', 'US Dollar', '$', 2),
    ('EUR', 'Euro', '€', 2),
    ('GBP', 'British Pound', '£', 2),
    ('JPY', 'Japanese Yen', '¥', 0),
    ('CHF', 'Swiss Franc', 'CHF', 2),
    ('CAD', 'Canadian Dollar', 'CA$', 2),
    ('AUD', 'Australian Dollar', 'A$', 2),
    ('IDR', 'Indonesian Rupiah', 'Rp', 0);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS expenses CASCADE;
DROP TABLE IF EXISTS currencies CASCADE;
DROP TABLE IF EXISTS family_requests CASCADE;
DROP TABLE IF EXISTS family_links CASCADE;
DROP TABLE IF EXISTS users CASCADE;
DROP FUNCTION IF EXISTS set_updated_at CASCADE;
";
