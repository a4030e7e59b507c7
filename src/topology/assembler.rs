//! Per-environment resource composition.
//!
//! Declares the VPC and everything hanging off it, in dependency order, then
//! exports the identifiers other stacks consume. The first failure aborts the
//! environment; partially declared resources are left to the engine.

use super::allocator::plan_subnets;
use super::security::{private_group, public_group, SecurityGroupSpec, SecurityRule};
use super::tags::tags_attr;
use super::zones::{select_zones, ZoneOrder, ZonePair};
use crate::engine::{ExportValue, ProvisioningEngine, ZoneFilter};
use crate::error::TopologyError;
use crate::models::{
    Attr, Attributes, Environment, Ipv4, ResourceHandle, ResourceKind, SubnetDescriptor,
    SubnetLayout, SubnetTier,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// Inputs shared by every environment of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildSettings {
    pub region: String,
    pub zone_order: ZoneOrder,
    pub layout: SubnetLayout,
}

impl BuildSettings {
    pub fn new(region: &str) -> BuildSettings {
        BuildSettings {
            region: region.to_string(),
            zone_order: ZoneOrder::default(),
            layout: SubnetLayout::default(),
        }
    }
}

/// A declared subnet.
#[derive(Serialize, Debug, Clone)]
pub struct PlacedSubnet {
    pub descriptor: SubnetDescriptor,
    pub handle: ResourceHandle,
}

/// A NAT Gateway with the address and subnet it is pinned to.
#[derive(Serialize, Debug, Clone)]
pub struct NatPlacement {
    pub handle: ResourceHandle,
    pub address: ResourceHandle,
    pub subnet: ResourceHandle,
    pub zone: String,
}

/// A route table and its inline default route, if any.
#[derive(Serialize, Debug, Clone)]
pub struct RouteTable {
    pub handle: ResourceHandle,
    pub default_target: Option<ResourceHandle>,
}

/// A default route declared as its own resource.
#[derive(Serialize, Debug, Clone)]
pub struct DefaultRoute {
    pub handle: ResourceHandle,
    pub route_table: ResourceHandle,
    pub destination: Ipv4,
    pub nat_gateway: ResourceHandle,
    pub zone: String,
}

/// A declared security group and the rules it was declared with.
#[derive(Serialize, Debug, Clone)]
pub struct SecurityGroup {
    pub handle: ResourceHandle,
    pub spec: SecurityGroupSpec,
}

/// Everything declared for one environment.
#[derive(Serialize, Debug, Clone)]
pub struct EnvironmentTopology {
    pub environment: Environment,
    pub zones: ZonePair,
    pub vpc: ResourceHandle,
    pub public_subnets: Vec<PlacedSubnet>,
    pub private_subnets: Vec<PlacedSubnet>,
    pub internet_gateway: ResourceHandle,
    pub nat_gateways: Vec<NatPlacement>,
    pub public_route_table: RouteTable,
    pub private_route_table: RouteTable,
    pub associations: Vec<ResourceHandle>,
    pub private_routes: Vec<DefaultRoute>,
    pub public_security_group: SecurityGroup,
    pub private_security_group: SecurityGroup,
    pub exports: BTreeMap<String, ExportValue>,
}

impl EnvironmentTopology {
    /// Every handle declared for the environment.
    pub fn handles(&self) -> Vec<&ResourceHandle> {
        let mut handles = vec![&self.vpc];
        handles.extend(self.public_subnets.iter().map(|s| &s.handle));
        handles.extend(self.private_subnets.iter().map(|s| &s.handle));
        handles.push(&self.internet_gateway);
        for nat in &self.nat_gateways {
            handles.push(&nat.address);
            handles.push(&nat.handle);
        }
        handles.push(&self.public_route_table.handle);
        handles.push(&self.private_route_table.handle);
        handles.extend(self.associations.iter());
        handles.extend(self.private_routes.iter().map(|r| &r.handle));
        handles.push(&self.public_security_group.handle);
        handles.push(&self.private_security_group.handle);
        handles
    }
}

/// Declares one environment's resources against an engine.
struct Assembler<'a, E: ?Sized> {
    engine: &'a mut E,
    environment: &'a Environment,
}

impl<'a, E> Assembler<'a, E>
where
    E: ProvisioningEngine + ?Sized,
{
    async fn declare(
        &mut self,
        kind: ResourceKind,
        resource: &str,
        mut attributes: Attributes,
        depends_on: &[&ResourceHandle],
    ) -> Result<ResourceHandle, TopologyError> {
        let logical_name = self.environment.logical_name(resource);
        if kind.is_taggable() {
            attributes.insert(
                "tags".to_string(),
                tags_attr(self.environment, &logical_name),
            );
        }
        let depends_on: Vec<ResourceHandle> = depends_on.iter().map(|h| (*h).clone()).collect();

        log::debug!("declare {kind} '{logical_name}'");
        self.engine
            .declare(kind, &logical_name, attributes, &depends_on)
            .await
            .map_err(|e| TopologyError::declaration(kind, &logical_name, e))
    }

    async fn export(
        &mut self,
        suffix: &str,
        value: ExportValue,
    ) -> Result<(String, ExportValue), TopologyError> {
        let key = self.environment.export_key(suffix);
        self.engine
            .export(&key, value.clone())
            .await
            .map_err(|e| TopologyError::declaration("export", &key, e))?;
        Ok((key, value))
    }

    async fn vpc(&mut self) -> Result<ResourceHandle, TopologyError> {
        let attributes = attrs([
            ("cidr_block", Attr::from(self.environment.block())),
            ("enable_dns_support", Attr::from(true)),
            ("enable_dns_hostnames", Attr::from(true)),
        ]);
        self.declare(ResourceKind::Vpc, "vpc", attributes, &[]).await
    }

    async fn subnet(
        &mut self,
        vpc: &ResourceHandle,
        descriptor: SubnetDescriptor,
    ) -> Result<PlacedSubnet, TopologyError> {
        let mut attributes = attrs([
            ("vpc_id", Attr::reference(vpc)),
            ("cidr_block", Attr::from(descriptor.cidr)),
            ("availability_zone", Attr::from(descriptor.zone.as_str())),
        ]);
        if descriptor.tier == SubnetTier::Public {
            attributes.insert("map_public_ip_on_launch".to_string(), Attr::from(true));
        }
        let handle = self
            .declare(ResourceKind::Subnet, &descriptor.resource_name(), attributes, &[])
            .await?;
        Ok(PlacedSubnet { descriptor, handle })
    }

    async fn elastic_ip(&mut self, ordinal: usize) -> Result<ResourceHandle, TopologyError> {
        self.declare(
            ResourceKind::ElasticIp,
            &format!("eip{ordinal}"),
            attrs([("domain", Attr::from("vpc"))]),
            &[],
        )
        .await
    }

    async fn nat_gateway(
        &mut self,
        ordinal: usize,
        subnet: &PlacedSubnet,
        address: ResourceHandle,
        internet_gateway: &ResourceHandle,
    ) -> Result<NatPlacement, TopologyError> {
        // no attribute references the gateway, so the edge must be explicit
        let handle = self
            .declare(
                ResourceKind::NatGateway,
                &format!("nat-gateway{ordinal}"),
                attrs([
                    ("subnet_id", Attr::reference(&subnet.handle)),
                    ("allocation_id", Attr::reference(&address)),
                ]),
                &[internet_gateway],
            )
            .await?;
        Ok(NatPlacement {
            handle,
            address,
            subnet: subnet.handle.clone(),
            zone: subnet.descriptor.zone.clone(),
        })
    }

    async fn association(
        &mut self,
        name: &str,
        subnet: &PlacedSubnet,
        table: &ResourceHandle,
    ) -> Result<ResourceHandle, TopologyError> {
        self.declare(
            ResourceKind::RouteTableAssociation,
            name,
            attrs([
                ("subnet_id", Attr::reference(&subnet.handle)),
                ("route_table_id", Attr::reference(table)),
            ]),
            &[],
        )
        .await
    }

    async fn security_group(
        &mut self,
        vpc: &ResourceHandle,
        spec: SecurityGroupSpec,
    ) -> Result<SecurityGroup, TopologyError> {
        let rules = |rules: &[SecurityRule]| Attr::List(rules.iter().map(|r| r.to_attr()).collect());
        let attributes = attrs([
            ("vpc_id", Attr::reference(vpc)),
            ("description", Attr::from(spec.description.as_str())),
            ("ingress", rules(&spec.ingress)),
            ("egress", rules(&spec.egress)),
        ]);
        let handle = self
            .declare(ResourceKind::SecurityGroup, &spec.resource, attributes, &[])
            .await?;
        Ok(SecurityGroup { handle, spec })
    }
}

fn attrs<const N: usize>(pairs: [(&str, Attr); N]) -> Attributes {
    pairs
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
}

fn default_route_attr(target_key: &str, target: &ResourceHandle) -> Attr {
    Attr::Map(attrs([
        ("cidr_block", Attr::from(Ipv4::ANY)),
        (target_key, Attr::reference(target)),
    ]))
}

/// Declare the full resource set of `environment`.
///
/// Layout validation, zone selection and subnet allocation all run before
/// the first declaration, so those errors leave the engine untouched.
pub async fn build_environment<E>(
    engine: &mut E,
    environment: &Environment,
    settings: &BuildSettings,
) -> Result<EnvironmentTopology, TopologyError>
where
    E: ProvisioningEngine + ?Sized,
{
    log::info!("#Start build_environment({environment})");

    settings.layout.validate()?;
    let filter = ZoneFilter::available_in(&settings.region);
    let zones = select_zones(engine, &filter, settings.zone_order).await?;
    let descriptors = plan_subnets(&environment.block(), &settings.layout, &zones)?;

    let mut asm = Assembler {
        engine,
        environment,
    };

    let vpc = asm.vpc().await?;

    let mut public_subnets = Vec::new();
    let mut private_subnets = Vec::new();
    for descriptor in descriptors {
        let placed = asm.subnet(&vpc, descriptor).await?;
        match placed.descriptor.tier {
            SubnetTier::Public => public_subnets.push(placed),
            SubnetTier::Private => private_subnets.push(placed),
        }
    }

    let internet_gateway = asm
        .declare(
            ResourceKind::InternetGateway,
            "igw",
            attrs([("vpc_id", Attr::reference(&vpc))]),
            &[],
        )
        .await?;

    let mut addresses = Vec::new();
    for i in 1..=public_subnets.len() {
        addresses.push(asm.elastic_ip(i).await?);
    }
    let mut nat_gateways = Vec::new();
    for (i, (subnet, address)) in public_subnets.iter().zip(addresses).enumerate() {
        nat_gateways.push(
            asm.nat_gateway(i + 1, subnet, address, &internet_gateway)
                .await?,
        );
    }

    let public_rt = asm
        .declare(
            ResourceKind::RouteTable,
            "public-rt",
            attrs([
                ("vpc_id", Attr::reference(&vpc)),
                (
                    "routes",
                    Attr::List(vec![default_route_attr("gateway_id", &internet_gateway)]),
                ),
            ]),
            &[],
        )
        .await?;
    let private_rt = asm
        .declare(
            ResourceKind::RouteTable,
            "private-rt",
            attrs([("vpc_id", Attr::reference(&vpc))]),
            &[],
        )
        .await?;

    let mut associations = Vec::new();
    for (tier, subnets, table) in [
        ("public", &public_subnets, &public_rt),
        ("private", &private_subnets, &private_rt),
    ] {
        for subnet in subnets {
            let name = format!("{tier}-rt-assoc{}", subnet.descriptor.ordinal);
            associations.push(asm.association(&name, subnet, table).await?);
        }
    }

    let mut private_routes = Vec::new();
    for (i, nat) in nat_gateways.iter().enumerate() {
        let handle = asm
            .declare(
                ResourceKind::Route,
                &format!("private-route{}", i + 1),
                attrs([
                    ("route_table_id", Attr::reference(&private_rt)),
                    ("destination_cidr_block", Attr::from(Ipv4::ANY)),
                    ("nat_gateway_id", Attr::reference(&nat.handle)),
                ]),
                &[&nat.handle],
            )
            .await?;
        private_routes.push(DefaultRoute {
            handle,
            route_table: private_rt.clone(),
            destination: Ipv4::ANY,
            nat_gateway: nat.handle.clone(),
            zone: nat.zone.clone(),
        });
    }

    let public_security_group = asm.security_group(&vpc, public_group()).await?;
    let private_security_group = asm
        .security_group(&vpc, private_group(environment.block()))
        .await?;

    let public_handles: Vec<&ResourceHandle> = public_subnets.iter().map(|s| &s.handle).collect();
    let private_handles: Vec<&ResourceHandle> =
        private_subnets.iter().map(|s| &s.handle).collect();
    let nat_handles: Vec<&ResourceHandle> = nat_gateways.iter().map(|n| &n.handle).collect();

    let exports = BTreeMap::from([
        asm.export("vpc_id", ExportValue::Id(vpc.id.clone())).await?,
        asm.export("public_subnets", ExportValue::ids(&public_handles))
            .await?,
        asm.export("private_subnets", ExportValue::ids(&private_handles))
            .await?,
        asm.export("nat_gateway_ids", ExportValue::ids(&nat_handles))
            .await?,
    ]);

    let topology = EnvironmentTopology {
        environment: environment.clone(),
        zones,
        vpc,
        public_subnets,
        private_subnets,
        public_route_table: RouteTable {
            handle: public_rt,
            default_target: Some(internet_gateway.clone()),
        },
        private_route_table: RouteTable {
            handle: private_rt,
            default_target: None,
        },
        internet_gateway,
        nat_gateways,
        associations,
        private_routes,
        public_security_group,
        private_security_group,
        exports,
    };

    log::info!(
        "#End build_environment({}) declared {} resources",
        environment.name(),
        topology.handles().len()
    );
    Ok(topology)
}
