use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical tracking statuses every provider/locale vocabulary resolves into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalStatus {
    /// Unit is known to the system but has not started moving
    Registered,
    /// Unit is moving between origin and destination
    InTransit,
    /// Unit reached the destination port/airport (includes vessel discharge)
    Arrived,
    /// Unit is with the final-mile courier
    OutForDelivery,
    /// Unit cleared import customs
    CustomsCleared,
    /// Unit was handed over to the consignee
    Delivered,
    /// Unit is behind its schedule
    Delayed,
    /// Unit is held, failed, or otherwise needs attention
    Exception,
}

impl CanonicalStatus {
    /// Check if no further provider polling is useful for this unit
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered)
    }

    /// Check if this status should surface on exception dashboards
    pub fn needs_attention(&self) -> bool {
        matches!(self, Self::Delayed | Self::Exception)
    }
}

impl fmt::Display for CanonicalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registered => write!(f, "registered"),
            Self::InTransit => write!(f, "in_transit"),
            Self::Arrived => write!(f, "arrived"),
            Self::OutForDelivery => write!(f, "out_for_delivery"),
            Self::CustomsCleared => write!(f, "customs_cleared"),
            Self::Delivered => write!(f, "delivered"),
            Self::Delayed => write!(f, "delayed"),
            Self::Exception => write!(f, "exception"),
        }
    }
}

impl std::str::FromStr for CanonicalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "registered" => Ok(Self::Registered),
            "in_transit" => Ok(Self::InTransit),
            "arrived" => Ok(Self::Arrived),
            "out_for_delivery" => Ok(Self::OutForDelivery),
            "customs_cleared" => Ok(Self::CustomsCleared),
            "delivered" => Ok(Self::Delivered),
            "delayed" => Ok(Self::Delayed),
            "exception" => Ok(Self::Exception),
            _ => Err(format!("Invalid canonical status: {s}")),
        }
    }
}

/// Shipment statuses, deliberately coarser than the tracking taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentStatus {
    /// Shipment exists but has not started moving
    Planned,
    /// Shipment is underway (covers delays and exceptions on the tracking side)
    InTransit,
    /// Shipment reached its destination
    Arrived,
    /// Shipment was delivered to the consignee
    Delivered,
}

impl ShipmentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

impl fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Planned => write!(f, "planned"),
            Self::InTransit => write!(f, "in_transit"),
            Self::Arrived => write!(f, "arrived"),
            Self::Delivered => write!(f, "delivered"),
        }
    }
}

impl std::str::FromStr for ShipmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "planned" => Ok(Self::Planned),
            "in_transit" => Ok(Self::InTransit),
            "arrived" => Ok(Self::Arrived),
            "delivered" => Ok(Self::Delivered),
            _ => Err(format!("Invalid shipment status: {s}")),
        }
    }
}
