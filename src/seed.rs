//! The fixed default widget set every dashboard starts from.

use crate::geometry::GridRect;
use crate::widget::{
    ActivityData, ActivityEntry, Customer, CustomerTier, GrowthData, LocationShare, LocationsData,
    MonthlyCount, StatsData, TableData, Widget, WidgetData,
};

const CUSTOMERS: &[(&str, &str, CustomerTier)] = &[
    ("Juan Pérez", "juan.perez", CustomerTier::Premium),
    ("María García", "maria.garcia", CustomerTier::Basic),
    ("Carlos López", "carlos.lopez", CustomerTier::Premium),
    ("Ana Martínez", "ana.martinez", CustomerTier::Basic),
    ("Luis Rodríguez", "luis.rodriguez", CustomerTier::Vip),
    ("Carmen Ruiz", "carmen.ruiz", CustomerTier::Premium),
    ("Miguel Torres", "miguel.torres", CustomerTier::Basic),
    ("Laura Sánchez", "laura.sanchez", CustomerTier::Vip),
    ("Diego Morales", "diego.morales", CustomerTier::Premium),
    ("Sofía Jiménez", "sofia.jimenez", CustomerTier::Basic),
    ("Roberto Herrera", "roberto.herrera", CustomerTier::Premium),
    ("Patricia Vega", "patricia.vega", CustomerTier::Vip),
    ("Fernando Castro", "fernando.castro", CustomerTier::Basic),
    ("Gabriela Mendoza", "gabriela.mendoza", CustomerTier::Premium),
    ("Andrés Romero", "andres.romero", CustomerTier::Vip),
    ("Valeria Guerrero", "valeria.guerrero", CustomerTier::Basic),
    ("Javier Delgado", "javier.delgado", CustomerTier::Premium),
    ("Natalia Vargas", "natalia.vargas", CustomerTier::Vip),
    ("Ricardo Flores", "ricardo.flores", CustomerTier::Basic),
    ("Isabella Cruz", "isabella.cruz", CustomerTier::Premium),
];

/// Build the seed collection. Ids are `widget-1` through `widget-5` and the
/// layout tiles the full width of a 6-column container.
pub fn default_widgets() -> Vec<Widget> {
    vec![
        Widget::new(
            "widget-1",
            "Registered Customers",
            WidgetData::Table(TableData { users: customers() }),
            GridRect::new(0, 0, 6, 4),
        ),
        Widget::new(
            "widget-2",
            "Customer Statistics",
            WidgetData::Stats(StatsData {
                total_users: 1247,
                active_users: 892,
                new_users_today: 23,
                admin_users: 12,
            }),
            GridRect::new(0, 4, 3, 2),
        ),
        Widget::new(
            "widget-3",
            "Customer Activity",
            WidgetData::Activity(ActivityData {
                activities: vec![
                    activity("Juan Pérez", "Purchase completed", "5 min ago"),
                    activity("María García", "Profile updated", "12 min ago"),
                    activity("Carlos López", "Support request", "1 hour ago"),
                    activity("Ana Martínez", "Plan renewed", "2 hours ago"),
                ],
            }),
            GridRect::new(3, 4, 3, 2),
        ),
        Widget::new(
            "widget-4",
            "Customer Growth",
            WidgetData::Growth(GrowthData {
                monthly: [
                    ("January", 89),
                    ("February", 127),
                    ("March", 156),
                    ("April", 203),
                    ("May", 178),
                    ("June", 234),
                ]
                .into_iter()
                .map(|(month, users)| MonthlyCount {
                    month: month.to_string(),
                    users,
                })
                .collect(),
                percentage: 23.5,
            }),
            GridRect::new(0, 6, 3, 3),
        ),
        Widget::new(
            "widget-5",
            "Customer Locations",
            WidgetData::Locations(LocationsData {
                locations: [
                    ("Mexico", 456, 36.6),
                    ("Spain", 289, 23.2),
                    ("Argentina", 234, 18.8),
                    ("Colombia", 156, 12.5),
                    ("Other", 112, 8.9),
                ]
                .into_iter()
                .map(|(country, users, percentage)| LocationShare {
                    country: country.to_string(),
                    users,
                    percentage,
                })
                .collect(),
            }),
            GridRect::new(3, 6, 3, 3),
        ),
    ]
}

fn customers() -> Vec<Customer> {
    CUSTOMERS
        .iter()
        .enumerate()
        .map(|(idx, (name, handle, tier))| Customer {
            id: idx as u32 + 1,
            name: (*name).to_string(),
            email: format!("{handle}@example.com"),
            tier: *tier,
        })
        .collect()
}

fn activity(user: &str, action: &str, time: &str) -> ActivityEntry {
    ActivityEntry {
        user: user.to_string(),
        action: action.to_string(),
        time: time.to_string(),
    }
}
