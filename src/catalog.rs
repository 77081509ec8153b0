//! Static registry of the monitoring queries the snmp-zte API understands.
//!
//! The set is closed and defined once; `lookup` returning `None` means
//! the identifier is unknown to this build, in which case callers fall
//! back to generic rendering and assume no extra parameters.

/// Navigation grouping for the query catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Core,
    Bandwidth,
    Provisioning,
    Statistics,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Core,
        Category::Bandwidth,
        Category::Provisioning,
        Category::Statistics,
    ];

    pub fn title(self) -> &'static str {
        match self {
            Category::Core => "Core",
            Category::Bandwidth => "Bandwidth",
            Category::Provisioning => "Provisioning",
            Category::Statistics => "Statistics & VLAN",
        }
    }
}

/// One entry in the query catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryDescriptor {
    pub id: &'static str,
    pub display_name: &'static str,
    pub category: Category,
    pub requires_onu_id: bool,
    pub requires_name: bool,
}

const fn entry(
    id: &'static str,
    display_name: &'static str,
    category: Category,
    requires_onu_id: bool,
    requires_name: bool,
) -> QueryDescriptor {
    QueryDescriptor {
        id,
        display_name,
        category,
        requires_onu_id,
        requires_name,
    }
}

pub const CATALOG: &[QueryDescriptor] = &[
    // Core
    entry("onu_list", "ONU List", Category::Core, false, false),
    entry("onu_detail", "ONU Detail", Category::Core, true, false),
    entry("empty_slots", "Empty Slots", Category::Core, false, false),
    entry("system_info", "System Info", Category::Core, false, false),
    entry("board_info", "Board Info", Category::Core, false, false),
    entry("all_boards", "All Boards", Category::Core, false, false),
    entry("pon_info", "PON Info", Category::Core, false, false),
    entry("interface_stats", "Interface Stats", Category::Core, false, false),
    entry("fan_info", "Fan Info", Category::Core, false, false),
    entry("temperature_info", "Temperature", Category::Core, false, false),
    entry("onu_traffic", "ONU Traffic", Category::Core, true, false),
    // Bandwidth
    entry("onu_bandwidth", "ONU Bandwidth", Category::Bandwidth, true, false),
    entry("pon_port_stats", "PON Port Stats", Category::Bandwidth, false, false),
    entry("onu_errors", "ONU Errors", Category::Bandwidth, true, false),
    entry("voltage_info", "Voltage Info", Category::Bandwidth, false, false),
    // Provisioning
    entry("onu_status", "ONU Status", Category::Provisioning, true, false),
    entry("onu_rename", "Rename ONU", Category::Provisioning, true, true),
    entry("onu_create", "Create ONU", Category::Provisioning, true, true),
    entry("onu_delete", "Delete ONU", Category::Provisioning, true, false),
    // Statistics & VLAN
    entry("distance_info", "Distance Info", Category::Statistics, true, false),
    entry("vlan_list", "VLAN List", Category::Statistics, false, false),
    entry("vlan_info", "VLAN Info", Category::Statistics, true, false),
    entry("profile_list", "Profile List", Category::Statistics, false, false),
];

pub fn lookup(id: &str) -> Option<&'static QueryDescriptor> {
    CATALOG.iter().find(|d| d.id == id)
}

pub fn in_category(category: Category) -> impl Iterator<Item = &'static QueryDescriptor> {
    CATALOG.iter().filter(move |d| d.category == category)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_round_trips_every_identifier() {
        for descriptor in CATALOG {
            let found = lookup(descriptor.id).expect("catalog entry must be found by id");
            assert_eq!(found.id, descriptor.id);
        }
    }

    #[test]
    fn unknown_identifier_yields_none() {
        assert!(lookup("bogus_query").is_none());
        assert!(lookup("").is_none());
    }

    #[test]
    fn identifiers_are_unique() {
        for descriptor in CATALOG {
            let count = CATALOG.iter().filter(|d| d.id == descriptor.id).count();
            assert_eq!(count, 1, "duplicate catalog id {}", descriptor.id);
        }
    }

    #[test]
    fn categories_partition_the_catalog() {
        let total: usize = Category::ALL.len();
        assert_eq!(total, 4);
        let sum: usize = Category::ALL
            .iter()
            .map(|&c| in_category(c).count())
            .sum();
        assert_eq!(sum, CATALOG.len());
    }

    #[test]
    fn name_is_only_required_where_onu_id_is() {
        for descriptor in CATALOG.iter().filter(|d| d.requires_name) {
            assert!(descriptor.requires_onu_id, "{} requires a name but no ONU id", descriptor.id);
        }
    }
}
