//! Commands for the Product context.

use catalog_core::command::Command;
use uuid::Uuid;

/// Command to register a new product. The handler assigns its id.
#[derive(Debug, Clone)]
pub struct RegisterProduct {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Display name.
    pub name: String,
    /// Free-text description.
    pub description: String,
    /// Raw SKU, validated by the aggregate.
    pub sku: String,
}

/// Command to rename a product.
#[derive(Debug, Clone)]
pub struct RenameProduct {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The product identifier.
    pub product_id: Uuid,
    /// The new name.
    pub name: String,
}

/// Command to replace a product's description.
#[derive(Debug, Clone)]
pub struct RedescribeProduct {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The product identifier.
    pub product_id: Uuid,
    /// The new description.
    pub description: String,
}

/// Command to retire a product.
#[derive(Debug, Clone)]
pub struct RetireProduct {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The product identifier.
    pub product_id: Uuid,
}

impl Command for RegisterProduct {
    fn command_type(&self) -> &'static str {
        "product.register"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

impl Command for RenameProduct {
    fn command_type(&self) -> &'static str {
        "product.rename"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

impl Command for RedescribeProduct {
    fn command_type(&self) -> &'static str {
        "product.redescribe"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

impl Command for RetireProduct {
    fn command_type(&self) -> &'static str {
        "product.retire"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
