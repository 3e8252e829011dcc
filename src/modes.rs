//! Numeric code tables of the primary interface
//!
//! Every table keeps unrecognised values as `Unknown(code)` so newer
//! controller firmware never turns into a decode failure, and `code()`
//! always gives back the byte that was on the wire.

/// Declare a code-backed enum with name lookup and an `Unknown` fallback
macro_rules! code_enum {
    (
        $(#[$meta:meta])*
        $name:ident($repr:ty) {
            $($variant:ident = $code:literal => $label:literal,)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
            Unknown($repr),
        }

        impl $name {
            pub fn from_code(code: $repr) -> Self {
                match code {
                    $($code => Self::$variant,)+
                    other => Self::Unknown(other),
                }
            }

            pub fn code(self) -> $repr {
                match self {
                    $(Self::$variant => $code,)+
                    Self::Unknown(code) => code,
                }
            }

            pub fn is_known(self) -> bool {
                !matches!(self, Self::Unknown(_))
            }

            /// Reverse of `Display` for the named variants
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($label => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($label),)+
                    Self::Unknown(code) => write!(f, "UNKNOWN({})", code),
                }
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
                serializer.collect_str(self)
            }
        }
    };
}

pub(crate) use code_enum;

code_enum! {
    /// Controller operating state, sent as a signed byte
    RobotMode(i8) {
        NoController = -1 => "NO_CONTROLLER",
        Disconnected = 0 => "DISCONNECTED",
        ConfirmSafety = 1 => "CONFIRM_SAFETY",
        Booting = 2 => "BOOTING",
        PowerOff = 3 => "POWER_OFF",
        PowerOn = 4 => "POWER_ON",
        Idle = 5 => "IDLE",
        Backdrive = 6 => "BACKDRIVE",
        Running = 7 => "RUNNING",
        UpdatingFirmware = 8 => "UPDATING_FIRMWARE",
    }
}

code_enum! {
    ControlMode(u8) {
        Position = 0 => "POSITION",
        Teach = 1 => "TEACH",
        Force = 2 => "FORCE",
        Torque = 3 => "TORQUE",
    }
}

code_enum! {
    JointMode(u8) {
        Reset = 235 => "RESET",
        ShuttingDown = 236 => "SHUTTING_DOWN",
        Backdrive = 238 => "BACKDRIVE",
        PowerOff = 239 => "POWER_OFF",
        ReadyForPowerOff = 240 => "READY_FOR_POWER_OFF",
        NotResponding = 245 => "NOT_RESPONDING",
        MotorInitialisation = 246 => "MOTOR_INITIALISATION",
        Booting = 247 => "BOOTING",
        Violation = 251 => "VIOLATION",
        Fault = 252 => "FAULT",
        Running = 253 => "RUNNING",
        Idle = 255 => "IDLE",
    }
}

code_enum! {
    ToolMode(u8) {
        Reset = 235 => "RESET",
        ShuttingDown = 236 => "SHUTTING_DOWN",
        PowerOff = 239 => "POWER_OFF",
        NotResponding = 245 => "NOT_RESPONDING",
        Booting = 247 => "BOOTING",
        Bootloader = 249 => "BOOTLOADER",
        Fault = 252 => "FAULT",
        Running = 253 => "RUNNING",
        Idle = 255 => "IDLE",
    }
}

code_enum! {
    SafetyMode(u8) {
        Normal = 1 => "NORMAL",
        Reduced = 2 => "REDUCED",
        ProtectiveStop = 3 => "PROTECTIVE_STOP",
        Recovery = 4 => "RECOVERY",
        SafeguardStop = 5 => "SAFEGUARD_STOP",
        SystemEmergencyStop = 6 => "SYSTEM_EMERGENCY_STOP",
        RobotEmergencyStop = 7 => "ROBOT_EMERGENCY_STOP",
        Violation = 8 => "VIOLATION",
        Fault = 9 => "FAULT",
        ValidateJointId = 10 => "VALIDATE_JOINT_ID",
        UndefinedSafetyMode = 11 => "UNDEFINED_SAFETY_MODE",
    }
}

code_enum! {
    /// Origin of a robot message, sent as a signed byte
    MessageSource(i8) {
        Joint0Fpga = 100 => "JOINT_0_FPGA",
        Joint0A = 110 => "JOINT_0_A",
        Joint0B = 120 => "JOINT_0_B",
        Joint1Fpga = 101 => "JOINT_1_FPGA",
        Joint1A = 111 => "JOINT_1_A",
        Joint1B = 121 => "JOINT_1_B",
        Joint2Fpga = 102 => "JOINT_2_FPGA",
        Joint2A = 112 => "JOINT_2_A",
        Joint2B = 122 => "JOINT_2_B",
        Joint3Fpga = 103 => "JOINT_3_FPGA",
        Joint3A = 113 => "JOINT_3_A",
        Joint3B = 123 => "JOINT_3_B",
        Joint4Fpga = 104 => "JOINT_4_FPGA",
        Joint4A = 114 => "JOINT_4_A",
        Joint4B = 124 => "JOINT_4_B",
        Joint5Fpga = 105 => "JOINT_5_FPGA",
        Joint5A = 115 => "JOINT_5_A",
        Joint5B = 125 => "JOINT_5_B",
        ToolFpga = 106 => "TOOL_FPGA",
        ToolA = 116 => "TOOL_A",
        ToolB = 126 => "TOOL_B",
        EuromapFpga = 107 => "EUROMAP_FPGA",
        EuromapA = 117 => "EUROMAP_A",
        EuromapB = 127 => "EUROMAP_B",
        TeachPendantA = 108 => "TEACH_PENDANT_A",
        TeachPendantB = 118 => "TEACH_PENDANT_B",
        ScbFpga = 40 => "SCB_FPGA",
        SafetyProcessorUa = 20 => "SAFETY_PROCESSOR_UA",
        SafetyProcessorUb = 30 => "SAFETY_PROCESSOR_UB",
        RobotInterface = -2 => "ROBOTINTERFACE",
        RtMachine = -3 => "RTMACHINE",
        SimulatedRobot = -4 => "SIMULATED_ROBOT",
        Gui = -5 => "GUI",
        Controller = 7 => "CONTROLLER",
        Rtde = 8 => "RTDE",
    }
}

code_enum! {
    /// Value type a popup request asks the operator for
    RequestValueType(u32) {
        Boolean = 0 => "BOOLEAN",
        Integer = 1 => "INTEGER",
        Float = 2 => "FLOAT",
        Text = 3 => "STRING",
        Pose = 4 => "POSE",
        JointVector = 5 => "JOINTVECTOR",
        Waypoint = 6 => "WAYPOINT",
        Expression = 7 => "EXPRESSION",
        NoValue = 8 => "NONE",
    }
}
