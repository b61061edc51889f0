//! Documented metadata categories, used to show what paths exist without
//! talking to the service.

use crate::node::LeafValue;
use crate::node::Node;
use crate::path::Namespace;
use std::fmt::Write as _;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CategoryDoc {
    /// Path below the namespace. `N` and `mac` stand for indexes and MAC
    /// addresses.
    pub category: &'static str,
    pub description: &'static str,
    /// Metadata version that introduced the category.
    pub version: &'static str,
}

pub const INSTANCE_METADATA_CATEGORIES: &[CategoryDoc] = &[
    CategoryDoc {
        category: "ami-id",
        description: "The AMI ID used to launch the instance.",
        version: "1.0",
    },
    CategoryDoc {
        category: "ami-launch-index",
        description: "If you started more than one instance at the same time, this value indicates the order in which the instance was launched. The value of the first instance launched is 0.",
        version: "1.0",
    },
    CategoryDoc {
        category: "ami-manifest-path",
        description: "The path to the AMI manifest file in Amazon S3. If you used an Amazon EBS-backed AMI to launch the instance, the returned result is unknown.",
        version: "1.0",
    },
    CategoryDoc {
        category: "ancestor-ami-ids",
        description: "The AMI IDs of any instances that were rebundled to create this AMI. This value will only exist if the AMI manifest file contained an ancestor-amis key.",
        version: "2007-10-10",
    },
    CategoryDoc {
        category: "autoscaling/target-lifecycle-state",
        description: "Value showing the target Auto Scaling lifecycle state that an Auto Scaling instance is transitioning to. Present when the instance transitions to one of the target lifecycle states after March 10, 2022. Possible values: `Detached` | `InService` | `Standby` | `Terminated` | `Warmed:Hibernated` | `Warmed:Running` | `Warmed:Stopped` | `Warmed:Terminated`. See [Retrieve the target lifecycle state through instance metadata](https://docs.aws.amazon.com/autoscaling/ec2/userguide/retrieving-target-lifecycle-state-through-imds.html) in the *Amazon EC2 Auto Scaling User Guide*.",
        version: "2021-07-15",
    },
    CategoryDoc {
        category: "block-device-mapping/ami",
        description: "The virtual device that contains the root/boot file system.",
        version: "2007-12-15",
    },
    CategoryDoc {
        category: "block-device-mapping/ebsN",
        description: "The virtual devices associated with any Amazon EBS volumes. Amazon EBS volumes are only available in metadata if they were present at launch time or when the instance was last started. The N indicates the index of the Amazon EBS volume (such as ebs1 or ebs2).",
        version: "2007-12-15",
    },
    CategoryDoc {
        category: "block-device-mapping/ephemeralN",
        description: "The virtual devices for any non-NVMe instance store volumes. The N indicates the index of each volume. The number of instance store volumes in the block device mapping might not match the actual number of instance store volumes for the instance. The instance type determines the number of instance store volumes that are available to an instance. If the number of instance store volumes in a block device mapping exceeds the number available to an instance, the additional instance store volumes are ignored.",
        version: "2007-12-15",
    },
    CategoryDoc {
        category: "block-device-mapping/root",
        description: "The virtual devices or partitions associated with the root devices or partitions on the virtual device, where the root (/ or C:) file system is associated with the given instance.",
        version: "2007-12-15",
    },
    CategoryDoc {
        category: "block-device-mapping/swap",
        description: "The virtual devices associated with swap. Not always present.",
        version: "2007-12-15",
    },
    CategoryDoc {
        category: "elastic-gpus/associations/elastic-gpu-id",
        description: "If there is an Elastic GPU attached to the instance, contains a JSON string with information about the Elastic GPU, including its ID and connection information.",
        version: "2016-11-30",
    },
    CategoryDoc {
        category: "elastic-inference/associations/eia-id",
        description: "If there is an Elastic Inference accelerator attached to the instance, contains a JSON string with information about the Elastic Inference accelerator, including its ID and type.",
        version: "2018-11-29",
    },
    CategoryDoc {
        category: "events/maintenance/history",
        description: "If there are completed or canceled maintenance events for the instance, contains a JSON string with information about the events. For more information, see [To view event history about completed or canceled events](monitoring-instances-status-check_sched.md#viewing-event-history).",
        version: "2018-08-17",
    },
    CategoryDoc {
        category: "events/maintenance/scheduled",
        description: "If there are active maintenance events for the instance, contains a JSON string with information about the events. For more information, see [View scheduled events](monitoring-instances-status-check_sched.md#viewing_scheduled_events).",
        version: "2018-08-17",
    },
    CategoryDoc {
        category: "events/recommendations/rebalance",
        description: "The approximate time, in UTC, when the EC2 instance rebalance recommendation notification is emitted for the instance. The following is an example of the metadata for this category: {\"noticeTime\": \"2020-11-05T08:22:00Z\"}. This category is available only after the notification is emitted. For more information, see [EC2 instance rebalance recommendations](rebalance-recommendations.md).",
        version: "2020-10-27",
    },
    CategoryDoc {
        category: "hostname",
        description: "If the EC2 instance is using IP-based naming (IPBN), this is the private IPv4 DNS hostname of the instance. If the EC2 instance is using Resource-based naming (RBN), this is the RBN. In cases where multiple network interfaces are present, this refers to the eth0 device (the device for which the device number is 0). For more information about IPBN and RBN, see [Amazon EC2 instance hostname types](ec2-instance-naming.md).",
        version: "1.0",
    },
    CategoryDoc {
        category: "iam/info",
        description: "If there is an IAM role associated with the instance, contains information about the last time the instance profile was updated, including the instance's LastUpdated date, InstanceProfileArn, and InstanceProfileId. Otherwise, not present.",
        version: "2012-01-12",
    },
    CategoryDoc {
        category: "iam/security-credentials/role-name",
        description: "If there is an IAM role associated with the instance, role-name is the name of the role, and role-name contains the temporary security credentials associated with the role (for more information, see [Retrieve security credentials from instance metadata](iam-roles-for-amazon-ec2.md#instance-metadata-security-credentials)). Otherwise, not present.",
        version: "2012-01-12",
    },
    CategoryDoc {
        category: "identity-credentials/ec2/info",
        description: "[Internal use only] Information about the credentials in identity-credentials/ec2/security-credentials/ec2-instance. These credentials are used by AWS features such as EC2 Instance Connect, and do not have any additional AWS API permissions or privileges beyond identifying the instance.",
        version: "2018-05-23",
    },
    CategoryDoc {
        category: "identity-credentials/ec2/security-credentials/ec2-instance",
        description: "[Internal use only] Credentials that allow on-instance software to identify itself to AWS to support features such as EC2 Instance Connect. These credentials do not have any additional AWS API permissions or privileges.",
        version: "2018-05-23",
    },
    CategoryDoc {
        category: "instance-action",
        description: "Notifies the instance that it should reboot in preparation for bundling. Valid values: none | shutdown | bundle-pending.",
        version: "2008-09-01",
    },
    CategoryDoc {
        category: "instance-id",
        description: "The ID of this instance.",
        version: "1.0",
    },
    CategoryDoc {
        category: "instance-life-cycle",
        description: "The purchasing option of this instance. For more information, see [Instance purchasing options](instance-purchasing-options.md).",
        version: "2019-10-01",
    },
    CategoryDoc {
        category: "instance-type",
        description: "The type of instance. For more information, see [Instance types](instance-types.md).",
        version: "2007-08-29",
    },
    CategoryDoc {
        category: "ipv6",
        description: "The IPv6 address of the instance. In cases where multiple network interfaces are present, this refers to the eth0 device (the device for which the device number is 0) network interface and the first IPv6 address assigned. If no IPv6 address exists on network interface[0], this item is not set and results in an HTTP 404 response.",
        version: "2021-01-03",
    },
    CategoryDoc {
        category: "kernel-id",
        description: "The ID of the kernel launched with this instance, if applicable.",
        version: "2008-02-01",
    },
    CategoryDoc {
        category: "local-hostname",
        description: "In cases where multiple network interfaces are present, this refers to the eth0 device (the device for which the device number is 0). If the EC2 instance is using IP-based naming (IPBN), this is the private IPv4 DNS hostname of the instance. If the EC2 instance is using Resource-based naming (RBN), this is the RBN. For more information about IPBN, RBN, and EC2 instance naming, see [Amazon EC2 instance hostname types](ec2-instance-naming.md).",
        version: "2007-01-19",
    },
    CategoryDoc {
        category: "local-ipv4",
        description: "The private IPv4 address of the instance. In cases where multiple network interfaces are present, this refers to the eth0 device (the device for which the device number is 0). If this is an IPv6-only instance, this item is not set and results in an HTTP 404 response.",
        version: "1.0",
    },
    CategoryDoc {
        category: "mac",
        description: "The instance's media access control (MAC) address. In cases where multiple network interfaces are present, this refers to the eth0 device (the device for which the device number is 0).",
        version: "2011-01-01",
    },
    CategoryDoc {
        category: "metrics/vhostmd",
        description: "No longer available.",
        version: "2011-05-01",
    },
    CategoryDoc {
        category: "network/interfaces/macs/mac/device-number",
        description: "The unique device number associated with that interface. The device number corresponds to the device name; for example, a device-number of 2 is for the eth2 device. This category corresponds to the DeviceIndex and device-index fields that are used by the Amazon EC2 API and the EC2 commands for the AWS CLI.",
        version: "2011-01-01",
    },
    CategoryDoc {
        category: "network/interfaces/macs/mac/interface-id",
        description: "The ID of the network interface.",
        version: "2011-01-01",
    },
    CategoryDoc {
        category: "network/interfaces/macs/mac/ipv4-associations/public-ip",
        description: "The private IPv4 addresses that are associated with each public IP address and assigned to that interface.",
        version: "2011-01-01",
    },
    CategoryDoc {
        category: "network/interfaces/macs/mac/ipv6s",
        description: "The IPv6 addresses associated with the interface. Returned only for instances launched into a VPC.",
        version: "2016-06-30",
    },
    CategoryDoc {
        category: "network/interfaces/macs/mac/local-hostname",
        description: "The private IPv4 DNS hostname of the instance. In cases where multiple network interfaces are present, this refers to the eth0 device (the device for which the device number is 0). If this is a IPv6-only instance, this is the resource-based name. For more information about IPBN and RBN, see [Amazon EC2 instance hostname types](ec2-instance-naming.md).",
        version: "2007-01-19",
    },
    CategoryDoc {
        category: "network/interfaces/macs/mac/local-ipv4s",
        description: "The private IPv4 addresses associated with the interface. If this is an IPv6-only network interface, this item is not set and results in an HTTP 404 response.",
        version: "2011-01-01",
    },
    CategoryDoc {
        category: "network/interfaces/macs/mac/mac",
        description: "The instance's MAC address.",
        version: "2011-01-01",
    },
    CategoryDoc {
        category: "network/interfaces/macs/mac/network-card-index",
        description: "The index of the network card. Some instance types support multiple network cards.",
        version: "2020-11-01",
    },
    CategoryDoc {
        category: "network/interfaces/macs/mac/owner-id",
        description: "The ID of the owner of the network interface. In multiple-interface environments, an interface can be attached by a third party, such as Elastic Load Balancing. Traffic on an interface is always billed to the interface owner.",
        version: "2011-01-01",
    },
    CategoryDoc {
        category: "network/interfaces/macs/mac/public-hostname",
        description: "The interface's public DNS (IPv4). This category is only returned if the enableDnsHostnames attribute is set to true. For more information, see [Using DNS with Your VPC](https://docs.aws.amazon.com/vpc/latest/userguide/vpc-dns.html) in the Amazon VPC User Guide. If the instance only has a public-IPv6 address and no public-IPv4 address, this item is not set and results in an HTTP 404 response.",
        version: "2011-01-01",
    },
    CategoryDoc {
        category: "network/interfaces/macs/mac/public-ipv4s",
        description: "The public IP address or Elastic IP addresses associated with the interface. There may be multiple IPv4 addresses on an instance.",
        version: "2011-01-01",
    },
    CategoryDoc {
        category: "network/interfaces/macs/mac/security-groups",
        description: "Security groups to which the network interface belongs.",
        version: "2011-01-01",
    },
    CategoryDoc {
        category: "network/interfaces/macs/mac/security-group-ids",
        description: "The IDs of the security groups to which the network interface belongs.",
        version: "2011-01-01",
    },
    CategoryDoc {
        category: "network/interfaces/macs/mac/subnet-id",
        description: "The ID of the subnet in which the interface resides.",
        version: "2011-01-01",
    },
    CategoryDoc {
        category: "network/interfaces/macs/mac/subnet-ipv4-cidr-block",
        description: "The IPv4 CIDR block of the subnet in which the interface resides.",
        version: "2011-01-01",
    },
    CategoryDoc {
        category: "network/interfaces/macs/mac/subnet-ipv6-cidr-blocks",
        description: "The IPv6 CIDR block of the subnet in which the interface resides.",
        version: "2016-06-30",
    },
    CategoryDoc {
        category: "network/interfaces/macs/mac/vpc-id",
        description: "The ID of the VPC in which the interface resides.",
        version: "2011-01-01",
    },
    CategoryDoc {
        category: "network/interfaces/macs/mac/vpc-ipv4-cidr-block",
        description: "The primary IPv4 CIDR block of the VPC.",
        version: "2011-01-01",
    },
    CategoryDoc {
        category: "network/interfaces/macs/mac/vpc-ipv4-cidr-blocks",
        description: "The IPv4 CIDR blocks for the VPC.",
        version: "2016-06-30",
    },
    CategoryDoc {
        category: "network/interfaces/macs/mac/vpc-ipv6-cidr-blocks",
        description: "The IPv6 CIDR block of the VPC in which the interface resides.",
        version: "2016-06-30",
    },
    CategoryDoc {
        category: "placement/availability-zone",
        description: "The Availability Zone in which the instance launched.",
        version: "2008-02-01",
    },
    CategoryDoc {
        category: "placement/availability-zone-id",
        description: "The static Availability Zone ID in which the instance is launched. The Availability Zone ID is consistent across accounts. However, it might be different from the Availability Zone, which can vary by account.",
        version: "2019-10-01",
    },
    CategoryDoc {
        category: "placement/group-name",
        description: "The name of the placement group in which the instance is launched.",
        version: "2020-08-24",
    },
    CategoryDoc {
        category: "placement/host-id",
        description: "The ID of the host on which the instance is launched. Applicable only to Dedicated Hosts.",
        version: "2020-08-24",
    },
    CategoryDoc {
        category: "placement/partition-number",
        description: "The number of the partition in which the instance is launched.",
        version: "2020-08-24",
    },
    CategoryDoc {
        category: "placement/region",
        description: "The AWS Region in which the instance is launched.",
        version: "2020-08-24",
    },
    CategoryDoc {
        category: "product-codes",
        description: "AWS Marketplace product codes associated with the instance, if any.",
        version: "2007-03-01",
    },
    CategoryDoc {
        category: "public-hostname",
        description: "The instance's public DNS (IPv4). This category is only returned if the enableDnsHostnames attribute is set to true. For more information, see [Using DNS with Your VPC](https://docs.aws.amazon.com/vpc/latest/userguide/vpc-dns.html) in the Amazon VPC User Guide. If the instance only has a public-IPv6 address and no public-IPv4 address, this item is not set and results in an HTTP 404 response.",
        version: "2007-01-19",
    },
    CategoryDoc {
        category: "public-ipv4",
        description: "The public IPv4 address. If an Elastic IP address is associated with the instance, the value returned is the Elastic IP address.",
        version: "2007-01-19",
    },
    CategoryDoc {
        category: "public-keys/0/openssh-key",
        description: "Public key. Only available if supplied at instance launch time.",
        version: "1.0",
    },
    CategoryDoc {
        category: "ramdisk-id",
        description: "The ID of the RAM disk specified at launch time, if applicable.",
        version: "2007-10-10",
    },
    CategoryDoc {
        category: "reservation-id",
        description: "The ID of the reservation.",
        version: "1.0",
    },
    CategoryDoc {
        category: "security-groups",
        description: "The names of the security groups applied to the instance. After launch, you can change the security groups of the instances. Such changes are reflected here and in network/interfaces/macs/**mac**/security-groups.",
        version: "1.0",
    },
    CategoryDoc {
        category: "services/domain",
        description: "The domain for AWS resources for the Region.",
        version: "2014-02-25",
    },
    CategoryDoc {
        category: "services/partition",
        description: "The partition that the resource is in. For standard AWS Regions, the partition is `aws`. If you have resources in other partitions, the partition is `aws-partitionname`. For example, the partition for resources in the China (Beijing) Region is `aws-cn`.",
        version: "2015-10-20",
    },
    CategoryDoc {
        category: "spot/instance-action",
        description: "The action (hibernate, stop, or terminate) and the approximate time, in UTC, when the action will occur. This item is present only if the Spot Instance has been marked for hibernate, stop, or terminate. For more information, see [instance-action](spot-instance-termination-notices.md#instance-action-metadata).",
        version: "2016-11-15",
    },
    CategoryDoc {
        category: "spot/termination-time",
        description: "The approximate time, in UTC, that the operating system for your Spot Instance will receive the shutdown signal. This item is present and contains a time value (for example, 2015-01-05T18:02:00Z) only if the Spot Instance has been marked for termination by Amazon EC2. The termination-time item is not set to a time if you terminated the Spot Instance yourself. For more information, see [termination-time](spot-instance-termination-notices.md#termination-time-metadata).",
        version: "2014-11-05",
    },
    CategoryDoc {
        category: "tags/instance",
        description: "The instance tags associated with the instance. Only available if you explicitly allow access to tags in instance metadata. For more information, see [Allow access to tags in instance metadata](Using_Tags.md#allow-access-to-tags-in-IMDS).",
        version: "2021-03-23",
    },
];

pub const DYNAMIC_CATEGORIES: &[CategoryDoc] = &[
    CategoryDoc {
        category: "fws/instance-monitoring",
        description: "Value showing whether the customer has enabled detailed one-minute monitoring in CloudWatch. Valid values: enabled | disabled",
        version: "2009-04-04",
    },
    CategoryDoc {
        category: "instance-identity/document",
        description: "JSON containing instance attributes, such as instance-id, private IP address, etc. See [Instance identity documents](instance-identity-documents.md).",
        version: "2009-04-04",
    },
    CategoryDoc {
        category: "instance-identity/pkcs7",
        description: "Used to verify the document's authenticity and content against the signature. See [Instance identity documents](instance-identity-documents.md).",
        version: "2009-04-04",
    },
    CategoryDoc {
        category: "instance-identity/signature",
        description: "Data that can be used by other parties to verify its origin and authenticity. See [Instance identity documents](instance-identity-documents.md).",
        version: "2009-04-04",
    },
];

pub fn metadata_docs() -> Node {
    namespace_docs(Namespace::MetaData, INSTANCE_METADATA_CATEGORIES)
}

pub fn dynamic_docs() -> Node {
    namespace_docs(Namespace::Dynamic, DYNAMIC_CATEGORIES)
}

pub fn userdata_docs() -> Node {
    Node::from_iter([(
        Namespace::UserData.as_str().to_string(),
        LeafValue::Scalar(String::new()),
    )])
}

pub fn all_docs() -> Node {
    let mut docs = userdata_docs();
    docs.merge(dynamic_docs());
    docs.merge(metadata_docs());
    docs
}

/// Documentation tree for one namespace.
pub fn docs_for(namespace: Namespace) -> Node {
    match namespace {
        Namespace::MetaData => metadata_docs(),
        Namespace::Dynamic => dynamic_docs(),
        Namespace::UserData => userdata_docs(),
    }
}

fn namespace_docs(namespace: Namespace, categories: &[CategoryDoc]) -> Node {
    let mut docs = Node::new();
    for entry in categories {
        let mut keys = vec![namespace.as_str()];
        keys.extend(entry.category.split('/'));
        docs.insert_at(&keys, LeafValue::Scalar(entry.description.to_string()));
    }
    docs
}

/// Description of a full path such as `meta-data/placement/region`.
pub fn describe(path: &str) -> Option<&'static str> {
    let path = path.trim().trim_matches('/');
    let (namespace, category) = path.split_once('/')?;
    let categories = match namespace.parse::<Namespace>().ok()? {
        Namespace::MetaData => INSTANCE_METADATA_CATEGORIES,
        Namespace::Dynamic => DYNAMIC_CATEGORIES,
        Namespace::UserData => return None,
    };
    categories
        .iter()
        .find(|entry| entry.category == category)
        .map(|entry| entry.description)
}

/// Indented listing of a tree's keys: values first, then directories with a
/// trailing `/`, each level indented two more spaces than `indent`.
pub fn render_paths(node: &Node, indent: usize) -> String {
    let mut out = String::new();
    write_paths(&mut out, node, indent);
    out
}

fn write_paths(out: &mut String, node: &Node, indent: usize) {
    let pad = " ".repeat(indent);
    for (key, value) in node {
        if !value.is_tree() {
            let _ = writeln!(out, "{pad}{key}");
        }
    }
    for (key, value) in node {
        if let LeafValue::SubTree(child) = value {
            let _ = writeln!(out, "{pad}{key}/");
            write_paths(out, child, indent + 2);
        }
    }
}
