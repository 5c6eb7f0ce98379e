pub mod document_store;
pub use document_store::{CollectionPath, DocumentStore, Scope};
pub mod memory_store;
pub use memory_store::MemoryDocumentStore;
pub mod pg_store;
pub use pg_store::PgDocumentStore;
pub mod repository;
pub use repository::{Document, Repository};
pub mod user_repo;
pub use user_repo::UserRepository;

use crate::models::{
    canteen::{CanteenProduct, CanteenSale},
    courses::{Course, Enrollment},
    email::{EmailAccount, EmailMessage},
    events::{AttendanceSession, CalendarEvent},
    finance::Donation,
    id_cards::IdCardLog,
    inventory::{InventoryCategory, InventoryItem, StockLog},
    master::{Affiliate, Invoice, Plan},
    members::{Member, SpiritualEntity},
    settings::SystemConfig,
    tenancy::SaasClient,
};

// Um repositório por entidade, como os serviços CRUD do front original
pub type ClientRepository = Repository<SaasClient>;
pub type ConfigRepository = Repository<SystemConfig>;
pub type MemberRepository = Repository<Member>;
pub type EntityRepository = Repository<SpiritualEntity>;
pub type CategoryRepository = Repository<InventoryCategory>;
pub type ItemRepository = Repository<InventoryItem>;
pub type StockLogRepository = Repository<StockLog>;
pub type CourseRepository = Repository<Course>;
pub type EnrollmentRepository = Repository<Enrollment>;
pub type ProductRepository = Repository<CanteenProduct>;
pub type SaleRepository = Repository<CanteenSale>;
pub type EventRepository = Repository<CalendarEvent>;
pub type AttendanceRepository = Repository<AttendanceSession>;
pub type IdCardLogRepository = Repository<IdCardLog>;
pub type EmailAccountRepository = Repository<EmailAccount>;
pub type EmailMessageRepository = Repository<EmailMessage>;
pub type DonationRepository = Repository<Donation>;
pub type PlanRepository = Repository<Plan>;
pub type AffiliateRepository = Repository<Affiliate>;
pub type InvoiceRepository = Repository<Invoice>;
